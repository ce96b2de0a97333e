//! Client-side expansion of recurring shift assignments.
//!
//! A recurring assignment is expanded into concrete [`NewShift`] records
//! before submission; nothing about the recurrence is stored.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::shift::NewShift;

/// Upper bound on occurrences accepted from the assignment form.
pub const MAX_OCCURRENCES: u32 = 366;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RepeatPattern {
  Daily,
  Weekly,
  /// Every two weeks.
  Biweekly,
  /// Same day of month; clamps to the month's last day.
  Monthly,
}

impl RepeatPattern {
  pub const ALL: [RepeatPattern; 4] =
    [Self::Daily, Self::Weekly, Self::Biweekly, Self::Monthly];

  /// The date of occurrence `n` (0-based) counted from `start`.
  pub fn nth(self, start: NaiveDate, n: u32) -> Option<NaiveDate> {
    match self {
      Self::Daily => start.checked_add_days(Days::new(u64::from(n))),
      Self::Weekly => start.checked_add_days(Days::new(7 * u64::from(n))),
      Self::Biweekly => start.checked_add_days(Days::new(14 * u64::from(n))),
      Self::Monthly => start.checked_add_months(Months::new(n)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
  pub pattern:     RepeatPattern,
  pub occurrences: u32,
}

impl Recurrence {
  /// Occurrence dates starting at `start`, stopping early only if the
  /// calendar runs out.
  pub fn dates(&self, start: NaiveDate) -> Vec<NaiveDate> {
    (0..self.occurrences)
      .map_while(|n| self.pattern.nth(start, n))
      .collect()
  }

  /// One copy of `template` per occurrence, re-dated.
  pub fn expand(&self, template: &NewShift) -> Vec<NewShift> {
    self
      .dates(template.shift_date)
      .into_iter()
      .map(|shift_date| NewShift { shift_date, ..template.clone() })
      .collect()
  }
}
