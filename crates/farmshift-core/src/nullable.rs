//! Serde helper for patch fields that distinguish "absent" from "null".
//!
//! A `ShiftPatch { notes: None, .. }` leaves notes untouched, while
//! `notes: Some(None)` clears them. On the wire these are an omitted key and an
//! explicit `null` respectively.

use serde::{Deserialize, Deserializer};

/// Use with `#[serde(default, deserialize_with = "crate::nullable::deserialize")]`.
pub fn deserialize<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}
