//! Shift types — one worker's scheduled work period on one date.
//!
//! A [`Shift`] is the read model: the persisted columns plus the worker and
//! farm join fields attached by the store at read time. [`NewShift`] and
//! [`ShiftPatch`] are the write-side inputs; neither carries join fields.

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

// ─── Enumerations ────────────────────────────────────────────────────────────

/// The kind of work period. Parsing is case-insensitive; anything that is not
/// one of the four known types becomes [`ShiftType::Unknown`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Display,
  EnumString,
  Serialize,
  Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(from = "String", into = "String")]
pub enum ShiftType {
  Morning,
  Evening,
  Night,
  /// A rest day.
  Off,
  Unknown,
}

impl ShiftType {
  /// The four types a shift can legitimately carry.
  pub const KNOWN: [ShiftType; 4] =
    [Self::Morning, Self::Evening, Self::Night, Self::Off];

  /// Lenient parse used for values coming off the wire or out of a form.
  pub fn parse_lenient(s: &str) -> Self {
    s.trim().parse().unwrap_or(Self::Unknown)
  }

  /// The standard working window for this type, if it has one.
  ///
  /// Night wraps past midnight: its end time is earlier than its start.
  pub fn default_window(self) -> Option<(NaiveTime, NaiveTime)> {
    let (start, end) = match self {
      Self::Morning => (5, 13),
      Self::Evening => (13, 21),
      Self::Night => (21, 5),
      Self::Off | Self::Unknown => return None,
    };
    Some((
      NaiveTime::from_hms_opt(start, 0, 0)?,
      NaiveTime::from_hms_opt(end, 0, 0)?,
    ))
  }
}

impl From<String> for ShiftType {
  fn from(s: String) -> Self { Self::parse_lenient(&s) }
}

impl From<ShiftType> for String {
  fn from(t: ShiftType) -> Self { t.to_string() }
}

/// Where a shift is in its lifecycle.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Hash,
  Display,
  EnumString,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ShiftStatus {
  #[default]
  Scheduled,
  Completed,
  Cancelled,
}

// ─── Join fields ─────────────────────────────────────────────────────────────

/// Denormalised worker columns attached to a shift at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRef {
  pub name:  String,
  pub email: Option<String>,
}

/// Denormalised farm columns attached to a shift at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmRef {
  pub name:     String,
  pub location: Option<String>,
}

// ─── Shift ───────────────────────────────────────────────────────────────────

/// A shift as returned by the store, joined with its worker and farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
  pub id:         Uuid,
  pub worker_id:  Uuid,
  /// `None` for a rest day.
  pub farm_id:    Option<Uuid>,
  pub shift_date: NaiveDate,
  pub shift_type: ShiftType,
  pub start_time: Option<NaiveTime>,
  pub end_time:   Option<NaiveTime>,
  pub notes:      Option<String>,
  #[serde(default)]
  pub status:     ShiftStatus,
  pub worker:     WorkerRef,
  pub farm:       Option<FarmRef>,
}

impl Shift {
  /// An `Off` shift with no farm and no times.
  pub fn is_rest_day(&self) -> bool {
    self.shift_type == ShiftType::Off
      && self.farm_id.is_none()
      && self.start_time.is_none()
      && self.end_time.is_none()
  }

  /// The persisted input fields of this shift, without identity or joins.
  pub fn input(&self) -> NewShift {
    NewShift {
      worker_id:  self.worker_id,
      farm_id:    self.farm_id,
      shift_date: self.shift_date,
      shift_type: self.shift_type,
      start_time: self.start_time,
      end_time:   self.end_time,
      notes:      self.notes.clone(),
      status:     self.status,
    }
  }

  /// Worked duration: the explicit start/end when both are set, otherwise the
  /// type's default window. An end before the start wraps past midnight.
  pub fn duration(&self) -> TimeDelta {
    let window = match (self.start_time, self.end_time) {
      (Some(start), Some(end)) => Some((start, end)),
      _ => self.shift_type.default_window(),
    };
    match window {
      Some((start, end)) if end >= start => end - start,
      Some((start, end)) => (end - start) + TimeDelta::days(1),
      None => TimeDelta::zero(),
    }
  }
}

// ─── NewShift ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::RecordStore::insert_shift`]. Excludes identity and
/// join fields; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShift {
  pub worker_id:  Uuid,
  pub farm_id:    Option<Uuid>,
  pub shift_date: NaiveDate,
  pub shift_type: ShiftType,
  #[serde(default)]
  pub start_time: Option<NaiveTime>,
  #[serde(default)]
  pub end_time:   Option<NaiveTime>,
  #[serde(default)]
  pub notes:      Option<String>,
  #[serde(default)]
  pub status:     ShiftStatus,
}

impl NewShift {
  /// A scheduled shift with no farm, times, or notes.
  pub fn new(worker_id: Uuid, shift_date: NaiveDate, shift_type: ShiftType) -> Self {
    Self {
      worker_id,
      farm_id: None,
      shift_date,
      shift_type,
      start_time: None,
      end_time: None,
      notes: None,
      status: ShiftStatus::default(),
    }
  }

  pub fn at_farm(mut self, farm_id: Uuid) -> Self {
    self.farm_id = Some(farm_id);
    self
  }
}

// ─── ShiftPatch ──────────────────────────────────────────────────────────────

/// A partial update. `None` leaves a field unchanged; for nullable columns,
/// `Some(None)` sets the column to null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub worker_id:  Option<Uuid>,
  #[serde(
    default,
    deserialize_with = "crate::nullable::deserialize",
    skip_serializing_if = "Option::is_none"
  )]
  pub farm_id:    Option<Option<Uuid>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub shift_date: Option<NaiveDate>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub shift_type: Option<ShiftType>,
  #[serde(
    default,
    deserialize_with = "crate::nullable::deserialize",
    skip_serializing_if = "Option::is_none"
  )]
  pub start_time: Option<Option<NaiveTime>>,
  #[serde(
    default,
    deserialize_with = "crate::nullable::deserialize",
    skip_serializing_if = "Option::is_none"
  )]
  pub end_time:   Option<Option<NaiveTime>>,
  #[serde(
    default,
    deserialize_with = "crate::nullable::deserialize",
    skip_serializing_if = "Option::is_none"
  )]
  pub notes:      Option<Option<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:     Option<ShiftStatus>,
}

impl ShiftPatch {
  /// A patch that only moves the shift to `status`.
  pub fn status(status: ShiftStatus) -> Self {
    Self { status: Some(status), ..Self::default() }
  }

  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Overwrite the fields of `input` named by this patch.
  pub fn apply_to(self, input: &mut NewShift) {
    if let Some(v) = self.worker_id {
      input.worker_id = v;
    }
    if let Some(v) = self.farm_id {
      input.farm_id = v;
    }
    if let Some(v) = self.shift_date {
      input.shift_date = v;
    }
    if let Some(v) = self.shift_type {
      input.shift_type = v;
    }
    if let Some(v) = self.start_time {
      input.start_time = v;
    }
    if let Some(v) = self.end_time {
      input.end_time = v;
    }
    if let Some(v) = self.notes {
      input.notes = v;
    }
    if let Some(v) = self.status {
      input.status = v;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shift_type_parses_case_insensitively() {
    assert_eq!(ShiftType::parse_lenient("morning"), ShiftType::Morning);
    assert_eq!(ShiftType::parse_lenient("NIGHT"), ShiftType::Night);
    assert_eq!(ShiftType::parse_lenient(" Off "), ShiftType::Off);
    assert_eq!(ShiftType::parse_lenient("brunch"), ShiftType::Unknown);
  }

  #[test]
  fn shift_type_serde_is_lenient() {
    let t: ShiftType = serde_json::from_str("\"evening\"").unwrap();
    assert_eq!(t, ShiftType::Evening);
    let t: ShiftType = serde_json::from_str("\"Siesta\"").unwrap();
    assert_eq!(t, ShiftType::Unknown);
    assert_eq!(serde_json::to_string(&ShiftType::Night).unwrap(), "\"Night\"");
  }

  #[test]
  fn status_uses_lowercase_on_the_wire() {
    assert_eq!(
      serde_json::to_string(&ShiftStatus::Cancelled).unwrap(),
      "\"cancelled\""
    );
    assert_eq!("Completed".parse::<ShiftStatus>().unwrap(), ShiftStatus::Completed);
  }

  #[test]
  fn patch_distinguishes_absent_from_null() {
    let patch: ShiftPatch = serde_json::from_str(r#"{"notes": null}"#).unwrap();
    assert_eq!(patch.notes, Some(None));
    assert_eq!(patch.farm_id, None);

    let patch: ShiftPatch = serde_json::from_str("{}").unwrap();
    assert!(patch.is_empty());
  }

  #[test]
  fn patch_applies_only_named_fields() {
    let worker = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let mut input = NewShift::new(worker, date, ShiftType::Morning);
    input.notes = Some("bring boots".into());

    ShiftPatch {
      shift_type: Some(ShiftType::Night),
      notes: Some(None),
      ..ShiftPatch::default()
    }
    .apply_to(&mut input);

    assert_eq!(input.shift_type, ShiftType::Night);
    assert_eq!(input.notes, None);
    assert_eq!(input.worker_id, worker);
    assert_eq!(input.shift_date, date);
  }

  fn shift(shift_type: ShiftType, start: Option<(u32, u32)>, end: Option<(u32, u32)>) -> Shift {
    let t = |(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap();
    Shift {
      id:         Uuid::new_v4(),
      worker_id:  Uuid::new_v4(),
      farm_id:    None,
      shift_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
      shift_type,
      start_time: start.map(t),
      end_time:   end.map(t),
      notes:      None,
      status:     ShiftStatus::Scheduled,
      worker:     WorkerRef { name: "John Doe".into(), email: None },
      farm:       None,
    }
  }

  #[test]
  fn duration_uses_explicit_times_then_default_window() {
    assert_eq!(
      shift(ShiftType::Morning, Some((6, 0)), Some((10, 30))).duration(),
      TimeDelta::minutes(270)
    );
    assert_eq!(shift(ShiftType::Evening, None, None).duration(), TimeDelta::hours(8));
    assert_eq!(shift(ShiftType::Night, None, None).duration(), TimeDelta::hours(8));
    assert_eq!(shift(ShiftType::Off, None, None).duration(), TimeDelta::zero());
  }

  #[test]
  fn rest_day_requires_off_and_no_farm() {
    assert!(shift(ShiftType::Off, None, None).is_rest_day());
    assert!(!shift(ShiftType::Morning, None, None).is_rest_day());
  }
}
