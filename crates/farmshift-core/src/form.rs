//! The shift assignment form: raw field text, validation, and submission.
//!
//! ```text
//! Editing ──submit──▶ Submitting ──ok──▶ Editing (fields reset)
//!    ▲  │                   └─────err──▶ Editing (fields kept, error set)
//!    └──┘ validation error (repository never contacted)
//! ```

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  error::{Error, ValidationError},
  recurrence::{MAX_OCCURRENCES, Recurrence, RepeatPattern},
  repository::ShiftRepository,
  shift::{NewShift, Shift, ShiftType},
  store::RecordStore,
};

// ─── Fields ──────────────────────────────────────────────────────────────────

/// The text fields of the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
  Worker,
  Farm,
  Date,
  ShiftType,
  StartTime,
  EndTime,
  Notes,
  Pattern,
  Occurrences,
}

impl FormField {
  pub const ALL: [FormField; 9] = [
    Self::Worker,
    Self::Farm,
    Self::Date,
    Self::ShiftType,
    Self::StartTime,
    Self::EndTime,
    Self::Notes,
    Self::Pattern,
    Self::Occurrences,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Self::Worker => "worker",
      Self::Farm => "farm",
      Self::Date => "date",
      Self::ShiftType => "shift type",
      Self::StartTime => "start time",
      Self::EndTime => "end time",
      Self::Notes => "notes",
      Self::Pattern => "repeat pattern",
      Self::Occurrences => "occurrences",
    }
  }

  pub fn is_required(self) -> bool {
    matches!(self, Self::Worker | Self::Farm | Self::Date | Self::ShiftType)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
  #[default]
  Editing,
  Submitting,
}

/// Why a submission did not fully go through.
#[derive(Debug, Error)]
#[error("{source} ({} of {requested} shifts created)", .created.len())]
pub struct SubmitError {
  /// Shifts created before the failure (recurring submissions only).
  pub created:   Vec<Shift>,
  pub requested: usize,
  pub source:    Error,
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// Assignment form state. Worker and farm hold ids as text; the dashboard
/// fills them from its pick lists.
#[derive(Debug, Clone, Default)]
pub struct AssignmentForm {
  pub worker:      String,
  pub farm:        String,
  pub date:        String,
  pub shift_type:  String,
  pub start_time:  String,
  pub end_time:    String,
  pub notes:       String,
  pub recurring:   bool,
  pub pattern:     String,
  pub occurrences: String,
  state:           FormState,
  error:           Option<String>,
}

impl AssignmentForm {
  pub fn new() -> Self { Self::default() }

  pub fn state(&self) -> FormState { self.state }

  /// The last validation or submission error, cleared by a successful submit.
  pub fn error(&self) -> Option<&str> { self.error.as_deref() }

  pub fn field(&self, field: FormField) -> &str {
    match field {
      FormField::Worker => &self.worker,
      FormField::Farm => &self.farm,
      FormField::Date => &self.date,
      FormField::ShiftType => &self.shift_type,
      FormField::StartTime => &self.start_time,
      FormField::EndTime => &self.end_time,
      FormField::Notes => &self.notes,
      FormField::Pattern => &self.pattern,
      FormField::Occurrences => &self.occurrences,
    }
  }

  pub fn field_mut(&mut self, field: FormField) -> &mut String {
    match field {
      FormField::Worker => &mut self.worker,
      FormField::Farm => &mut self.farm,
      FormField::Date => &mut self.date,
      FormField::ShiftType => &mut self.shift_type,
      FormField::StartTime => &mut self.start_time,
      FormField::EndTime => &mut self.end_time,
      FormField::Notes => &mut self.notes,
      FormField::Pattern => &mut self.pattern,
      FormField::Occurrences => &mut self.occurrences,
    }
  }

  /// Set the shift type, filling empty start/end times with its standard
  /// window.
  pub fn select_shift_type(&mut self, shift_type: ShiftType) {
    self.shift_type = shift_type.to_string();
    if let Some((start, end)) = shift_type.default_window() {
      if self.start_time.is_empty() {
        self.start_time = start.format("%H:%M").to_string();
      }
      if self.end_time.is_empty() {
        self.end_time = end.format("%H:%M").to_string();
      }
    }
  }

  /// Clear every field and the error, back to a fresh `Editing` form.
  pub fn reset(&mut self) { *self = Self::default(); }

  // ── Validation ────────────────────────────────────────────────────────

  /// Parse the fields into the shifts a submission would create.
  pub fn validate(&self) -> Result<Vec<NewShift>, ValidationError> {
    let mut missing: Vec<&'static str> = FormField::ALL
      .into_iter()
      .filter(|f| f.is_required() && self.field(*f).trim().is_empty())
      .map(FormField::label)
      .collect();
    if self.recurring {
      for f in [FormField::Pattern, FormField::Occurrences] {
        if self.field(f).trim().is_empty() {
          missing.push(f.label());
        }
      }
    }
    if !missing.is_empty() {
      return Err(ValidationError::MissingFields(missing));
    }

    let worker_id = parse_id(FormField::Worker, &self.worker)?;
    let farm_id = parse_id(FormField::Farm, &self.farm)?;
    let shift_date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
      .map_err(|_| invalid(FormField::Date, &self.date))?;
    let shift_type = match ShiftType::parse_lenient(&self.shift_type) {
      ShiftType::Unknown => return Err(invalid(FormField::ShiftType, &self.shift_type)),
      t => t,
    };

    let mut template = NewShift::new(worker_id, shift_date, shift_type).at_farm(farm_id);
    template.start_time = parse_time(FormField::StartTime, &self.start_time)?;
    template.end_time = parse_time(FormField::EndTime, &self.end_time)?;
    template.notes = Some(self.notes.trim().to_owned()).filter(|n| !n.is_empty());

    if !self.recurring {
      return Ok(vec![template]);
    }
    let pattern: RepeatPattern = self
      .pattern
      .trim()
      .parse()
      .map_err(|_| invalid(FormField::Pattern, &self.pattern))?;
    let occurrences: u32 = self
      .occurrences
      .trim()
      .parse()
      .ok()
      .filter(|n| (1..=MAX_OCCURRENCES).contains(n))
      .ok_or_else(|| invalid(FormField::Occurrences, &self.occurrences))?;

    Ok(Recurrence { pattern, occurrences }.expand(&template))
  }

  // ── Submission ────────────────────────────────────────────────────────

  /// Validate, then create every resulting shift through `repo` in date
  /// order, stopping at the first failure.
  ///
  /// On success the form resets. On failure the fields are kept and the
  /// error is recorded; a validation failure never reaches `repo`.
  pub async fn submit<S: RecordStore>(
    &mut self,
    repo: &ShiftRepository<S>,
  ) -> Result<Vec<Shift>, SubmitError> {
    let inputs = match self.validate() {
      Ok(inputs) => inputs,
      Err(e) => {
        self.error = Some(e.to_string());
        return Err(SubmitError { created: Vec::new(), requested: 0, source: e.into() });
      }
    };

    self.state = FormState::Submitting;
    let requested = inputs.len();
    let mut created = Vec::with_capacity(requested);
    for input in inputs {
      match repo.create(input).await {
        Ok(shift) => created.push(shift),
        Err(source) => {
          self.state = FormState::Editing;
          self.error = Some(source.to_string());
          return Err(SubmitError { created, requested, source });
        }
      }
    }

    self.reset();
    Ok(created)
  }
}

fn invalid(field: FormField, value: &str) -> ValidationError {
  ValidationError::Invalid { field: field.label(), value: value.to_owned() }
}

fn parse_id(field: FormField, value: &str) -> Result<Uuid, ValidationError> {
  Uuid::parse_str(value.trim()).map_err(|_| invalid(field, value))
}

fn parse_time(field: FormField, value: &str) -> Result<Option<NaiveTime>, ValidationError> {
  let value = value.trim();
  if value.is_empty() {
    return Ok(None);
  }
  NaiveTime::parse_from_str(value, "%H:%M")
    .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
    .map(Some)
    .map_err(|_| invalid(field, value))
}
