//! Farms — the places shifts are worked at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farm {
  pub id:         Uuid,
  pub name:       String,
  pub location:   Option<String>,
  /// Free-text category, e.g. "Dairy" or "Poultry". Stored as `type`.
  #[serde(rename = "type")]
  pub farm_type:  Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::insert_farm`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFarm {
  pub name:      String,
  #[serde(default)]
  pub location:  Option<String>,
  #[serde(default, rename = "type")]
  pub farm_type: Option<String>,
}

impl NewFarm {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), location: None, farm_type: None }
  }
}

/// A partial update; see [`crate::shift::ShiftPatch`] for the null convention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:      Option<String>,
  #[serde(
    default,
    deserialize_with = "crate::nullable::deserialize",
    skip_serializing_if = "Option::is_none"
  )]
  pub location:  Option<Option<String>>,
  #[serde(
    default,
    rename = "type",
    deserialize_with = "crate::nullable::deserialize",
    skip_serializing_if = "Option::is_none"
  )]
  pub farm_type: Option<Option<String>>,
}

impl FarmPatch {
  pub fn apply_to(self, farm: &mut Farm) {
    if let Some(v) = self.name {
      farm.name = v;
    }
    if let Some(v) = self.location {
      farm.location = v;
    }
    if let Some(v) = self.farm_type {
      farm.farm_type = v;
    }
  }
}
