//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with fixed microsecond precision so they
//! sort lexically. Dates are `YYYY-MM-DD`, times `HH:MM:SS`. UUIDs are
//! hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use farmshift_core::{
  farm::Farm,
  shift::{FarmRef, Shift, ShiftStatus, ShiftType, WorkerRef},
  worker::Worker,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

/// Accepts `HH:MM` as well, for rows written by hand.
pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S")
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enumerations ────────────────────────────────────────────────────────────

/// `Unknown` has no column value; the CHECK constraint rejects it on insert.
pub fn encode_shift_type(t: ShiftType) -> String { t.to_string() }

pub fn decode_status(s: &str) -> Result<ShiftStatus> {
  s.parse()
    .map_err(|_| Error::Decode { column: "status", value: s.to_owned() })
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `farms` row.
pub struct RawFarm {
  pub id:         String,
  pub name:       String,
  pub location:   Option<String>,
  pub farm_type:  Option<String>,
  pub created_at: String,
}

pub const FARM_COLUMNS: &str = "id, name, location, type, created_at";

impl RawFarm {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      location:   row.get(2)?,
      farm_type:  row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_farm(self) -> Result<Farm> {
    Ok(Farm {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      location:   self.location,
      farm_type:  self.farm_type,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `workers` row.
pub struct RawWorker {
  pub id:         String,
  pub name:       String,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub created_at: String,
}

pub const WORKER_COLUMNS: &str = "id, name, email, phone, created_at";

impl RawWorker {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      email:      row.get(2)?,
      phone:      row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_worker(self) -> Result<Worker> {
    Ok(Worker {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      email:      self.email,
      phone:      self.phone,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from a `shifts` row joined with `workers` and `farms`.
pub struct RawShift {
  pub id:            String,
  pub worker_id:     String,
  pub farm_id:       Option<String>,
  pub shift_date:    String,
  pub shift_type:    String,
  pub start_time:    Option<String>,
  pub end_time:      Option<String>,
  pub notes:         Option<String>,
  pub status:        String,
  pub worker_name:   String,
  pub worker_email:  Option<String>,
  pub farm_name:     Option<String>,
  pub farm_location: Option<String>,
}

/// Joined select shared by every shift read. Append a `WHERE` clause.
pub const SHIFT_SELECT: &str = "
SELECT s.id, s.worker_id, s.farm_id, s.shift_date, s.shift_type,
       s.start_time, s.end_time, s.notes, s.status,
       w.name, w.email, f.name, f.location
  FROM shifts s
  JOIN workers w ON w.id = s.worker_id
  LEFT JOIN farms f ON f.id = s.farm_id";

impl RawShift {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      worker_id:     row.get(1)?,
      farm_id:       row.get(2)?,
      shift_date:    row.get(3)?,
      shift_type:    row.get(4)?,
      start_time:    row.get(5)?,
      end_time:      row.get(6)?,
      notes:         row.get(7)?,
      status:        row.get(8)?,
      worker_name:   row.get(9)?,
      worker_email:  row.get(10)?,
      farm_name:     row.get(11)?,
      farm_location: row.get(12)?,
    })
  }

  pub fn into_shift(self) -> Result<Shift> {
    let farm = self
      .farm_name
      .map(|name| FarmRef { name, location: self.farm_location });
    Ok(Shift {
      id: decode_uuid(&self.id)?,
      worker_id: decode_uuid(&self.worker_id)?,
      farm_id: self.farm_id.as_deref().map(decode_uuid).transpose()?,
      shift_date: decode_date(&self.shift_date)?,
      shift_type: ShiftType::parse_lenient(&self.shift_type),
      start_time: self.start_time.as_deref().map(decode_time).transpose()?,
      end_time: self.end_time.as_deref().map(decode_time).transpose()?,
      notes: self.notes,
      status: decode_status(&self.status)?,
      worker: WorkerRef { name: self.worker_name, email: self.worker_email },
      farm,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let a = DateTime::parse_from_rfc3339("2024-06-01T10:00:00Z").unwrap().with_timezone(&Utc);
    let b = DateTime::parse_from_rfc3339("2024-06-01T10:00:00.5Z").unwrap().with_timezone(&Utc);
    assert_eq!(encode_dt(a).len(), encode_dt(b).len());
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn time_accepts_short_form() {
    assert_eq!(decode_time("05:30").unwrap(), NaiveTime::from_hms_opt(5, 30, 0).unwrap());
    assert_eq!(encode_time(NaiveTime::from_hms_opt(21, 0, 0).unwrap()), "21:00:00");
  }

  #[test]
  fn unknown_status_is_a_decode_error() {
    assert!(matches!(decode_status("paused"), Err(Error::Decode { column: "status", .. })));
  }
}
