//! Workers — the people shifts are assigned to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
  pub id:         Uuid,
  pub name:       String,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::insert_worker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorker {
  pub name:  String,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
}

impl NewWorker {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), email: None, phone: None }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:  Option<String>,
  #[serde(
    default,
    deserialize_with = "crate::nullable::deserialize",
    skip_serializing_if = "Option::is_none"
  )]
  pub email: Option<Option<String>>,
  #[serde(
    default,
    deserialize_with = "crate::nullable::deserialize",
    skip_serializing_if = "Option::is_none"
  )]
  pub phone: Option<Option<String>>,
}

impl WorkerPatch {
  pub fn apply_to(self, worker: &mut Worker) {
    if let Some(v) = self.name {
      worker.name = v;
    }
    if let Some(v) = self.email {
      worker.email = v;
    }
    if let Some(v) = self.phone {
      worker.phone = v;
    }
  }
}
