//! Derived views — read-only projections of a shift snapshot.
//!
//! Every function here is pure and total: no I/O, no clock reads, no errors.
//! "Today" is always supplied by the caller. Shifts whose type did not parse
//! land in the [`ShiftType::Unknown`] bucket instead of failing.

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shift::{Shift, ShiftStatus, ShiftType};

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Calendar color for a shift type.
pub fn shift_color(shift_type: ShiftType) -> &'static str {
  match shift_type {
    ShiftType::Morning => "#10b981",
    ShiftType::Evening => "#f59e0b",
    ShiftType::Night => "#3b82f6",
    ShiftType::Off => "#6b7280",
    ShiftType::Unknown => "#8b5cf6",
  }
}

// ─── Calendar events ─────────────────────────────────────────────────────────

/// Details shown when a calendar event is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
  pub worker:     String,
  /// The farm name, or `"Rest Day"` when the shift has no farm.
  pub farm:       String,
  /// The farm location, or `"-"`.
  pub location:   String,
  #[serde(rename = "type")]
  pub shift_type: ShiftType,
  /// The shift notes, or `"No notes"`.
  pub notes:      String,
  pub status:     ShiftStatus,
  pub start_time: Option<NaiveTime>,
  pub end_time:   Option<NaiveTime>,
}

/// One displayable calendar entry, shaped for calendar widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
  pub id:               Uuid,
  pub title:            String,
  pub start:            NaiveDate,
  pub background_color: String,
  pub border_color:     String,
  pub extended_props:   EventDetails,
}

pub fn to_calendar_event(shift: &Shift) -> CalendarEvent {
  let color = shift_color(shift.shift_type);
  CalendarEvent {
    id:               shift.id,
    title:            format!("{} - {}", shift.worker.name, shift.shift_type),
    start:            shift.shift_date,
    background_color: color.to_owned(),
    border_color:     color.to_owned(),
    extended_props:   EventDetails {
      worker:     shift.worker.name.clone(),
      farm:       shift.farm.as_ref().map_or_else(|| "Rest Day".to_owned(), |f| f.name.clone()),
      location:   shift
        .farm
        .as_ref()
        .and_then(|f| f.location.clone())
        .unwrap_or_else(|| "-".to_owned()),
      shift_type: shift.shift_type,
      notes:      shift.notes.clone().unwrap_or_else(|| "No notes".to_owned()),
      status:     shift.status,
      start_time: shift.start_time,
      end_time:   shift.end_time,
    },
  }
}

/// One event per shift, in input order.
pub fn to_calendar_events(shifts: &[Shift]) -> Vec<CalendarEvent> {
  shifts.iter().map(to_calendar_event).collect()
}

/// Events starting on `date`, as listed by a calendar date click.
pub fn events_on(events: &[CalendarEvent], date: NaiveDate) -> Vec<&CalendarEvent> {
  events.iter().filter(|e| e.start == date).collect()
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Shifts dated exactly `today`, in input order.
pub fn todays_shifts(shifts: &[Shift], today: NaiveDate) -> Vec<Shift> {
  shifts.iter().filter(|s| s.shift_date == today).cloned().collect()
}

/// Shifts on or after `from`, in input order.
pub fn upcoming_from(shifts: &[Shift], from: NaiveDate) -> Vec<Shift> {
  shifts.iter().filter(|s| s.shift_date >= from).cloned().collect()
}

/// Up to `limit` of `worker_id`'s shifts, in input (date) order.
pub fn upcoming_for_worker(shifts: &[Shift], worker_id: Uuid, limit: usize) -> Vec<Shift> {
  shifts
    .iter()
    .filter(|s| s.worker_id == worker_id)
    .take(limit)
    .cloned()
    .collect()
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// Shifts per type. The four known types are always present, zero-filled;
/// [`ShiftType::Unknown`] appears only when some shift carries it.
pub fn count_by_type(shifts: &[Shift]) -> BTreeMap<ShiftType, usize> {
  let mut counts: BTreeMap<ShiftType, usize> =
    ShiftType::KNOWN.into_iter().map(|t| (t, 0)).collect();
  for shift in shifts {
    *counts.entry(shift.shift_type).or_default() += 1;
  }
  counts
}

pub fn distinct_worker_count(shifts: &[Shift]) -> usize {
  shifts.iter().map(|s| s.worker_id).collect::<HashSet<_>>().len()
}

/// Farms referenced by at least one shift; rest days don't count.
pub fn distinct_farm_count(shifts: &[Shift]) -> usize {
  shifts.iter().filter_map(|s| s.farm_id).collect::<HashSet<_>>().len()
}

/// Headline numbers for the admin overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftStats {
  pub total_shifts:       usize,
  pub active_workers:     usize,
  pub farms_in_operation: usize,
  /// Share of shifts marked completed, in `0.0..=1.0`; `None` with no shifts.
  pub completion_rate:    Option<f64>,
}

pub fn shift_stats(shifts: &[Shift]) -> ShiftStats {
  let completed = shifts.iter().filter(|s| s.status == ShiftStatus::Completed).count();
  ShiftStats {
    total_shifts:       shifts.len(),
    active_workers:     distinct_worker_count(shifts),
    farms_in_operation: distinct_farm_count(shifts),
    completion_rate:    (!shifts.is_empty()).then(|| completed as f64 / shifts.len() as f64),
  }
}

/// Hours worked on one shift; see [`Shift::duration`].
pub fn shift_hours(shift: &Shift) -> f64 { shift.duration().num_minutes() as f64 / 60.0 }

/// The worker dashboard's summary of one worker's shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSummary {
  pub total_shifts: usize,
  pub total_hours:  f64,
  pub farms:        usize,
}

pub fn worker_summary(shifts: &[Shift], worker_id: Uuid) -> WorkerSummary {
  let mine: Vec<&Shift> = shifts.iter().filter(|s| s.worker_id == worker_id).collect();
  let total = mine.iter().map(|s| s.duration()).fold(TimeDelta::zero(), |acc, d| acc + d);
  WorkerSummary {
    total_shifts: mine.len(),
    total_hours:  total.num_minutes() as f64 / 60.0,
    farms:        mine.iter().filter_map(|s| s.farm_id).collect::<HashSet<_>>().len(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shift::{FarmRef, WorkerRef};

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  fn shift(worker_id: Uuid, day: &str, shift_type: ShiftType) -> Shift {
    Shift {
      id: Uuid::new_v4(),
      worker_id,
      farm_id: None,
      shift_date: date(day),
      shift_type,
      start_time: None,
      end_time: None,
      notes: None,
      status: ShiftStatus::Scheduled,
      worker: WorkerRef { name: "John Doe".into(), email: None },
      farm: None,
    }
  }

  fn at_farm(mut s: Shift, farm_id: Uuid, name: &str) -> Shift {
    s.farm_id = Some(farm_id);
    s.farm = Some(FarmRef { name: name.into(), location: Some("North Valley".into()) });
    s
  }

  #[test]
  fn one_event_per_shift_with_fixed_colors() {
    let w = Uuid::new_v4();
    let shifts: Vec<_> = ShiftType::KNOWN
      .into_iter()
      .chain([ShiftType::Unknown])
      .map(|t| shift(w, "2024-06-01", t))
      .collect();

    let events = to_calendar_events(&shifts);
    assert_eq!(events.len(), shifts.len());
    let colors: Vec<_> = events.iter().map(|e| e.background_color.as_str()).collect();
    assert_eq!(colors, ["#10b981", "#f59e0b", "#3b82f6", "#6b7280", "#8b5cf6"]);
    for (event, shift) in events.iter().zip(&shifts) {
      assert_eq!(event.id, shift.id);
      assert_eq!(event.border_color, event.background_color);
    }
  }

  #[test]
  fn event_title_and_details() {
    let w = Uuid::new_v4();
    let rest = shift(w, "2024-06-01", ShiftType::Off);
    let event = to_calendar_event(&rest);
    assert_eq!(event.title, "John Doe - Off");
    assert_eq!(event.extended_props.farm, "Rest Day");
    assert_eq!(event.extended_props.location, "-");
    assert_eq!(event.extended_props.notes, "No notes");

    let mut worked = at_farm(shift(w, "2024-06-02", ShiftType::Morning), Uuid::new_v4(), "Dairy Farm A");
    worked.notes = Some("feed calves first".into());
    let event = to_calendar_event(&worked);
    assert_eq!(event.extended_props.farm, "Dairy Farm A");
    assert_eq!(event.extended_props.location, "North Valley");
    assert_eq!(event.extended_props.notes, "feed calves first");
  }

  #[test]
  fn events_serialize_in_camel_case() {
    let event = to_calendar_event(&shift(Uuid::new_v4(), "2024-06-01", ShiftType::Night));
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["backgroundColor"], "#3b82f6");
    assert_eq!(json["start"], "2024-06-01");
    assert_eq!(json["extendedProps"]["type"], "Night");
    assert_eq!(json["extendedProps"]["status"], "scheduled");
  }

  #[test]
  fn todays_shifts_is_exact_subset() {
    let w = Uuid::new_v4();
    let shifts = vec![
      shift(w, "2024-06-01", ShiftType::Morning),
      shift(w, "2024-06-02", ShiftType::Evening),
      shift(w, "2024-06-03", ShiftType::Night),
    ];
    let today = todays_shifts(&shifts, date("2024-06-02"));
    assert_eq!(today, vec![shifts[1].clone()]);
    assert!(todays_shifts(&shifts, date("2024-07-01")).is_empty());
  }

  #[test]
  fn todays_shifts_preserves_relative_order() {
    let w = Uuid::new_v4();
    let shifts = vec![
      shift(w, "2024-06-02", ShiftType::Night),
      shift(w, "2024-06-01", ShiftType::Morning),
      shift(w, "2024-06-02", ShiftType::Morning),
    ];
    let ids: Vec<_> = todays_shifts(&shifts, date("2024-06-02")).iter().map(|s| s.id).collect();
    assert_eq!(ids, [shifts[0].id, shifts[2].id]);
  }

  #[test]
  fn count_by_type_zero_fills() {
    let w = Uuid::new_v4();
    let shifts = vec![
      shift(w, "2024-06-01", ShiftType::Morning),
      shift(w, "2024-06-02", ShiftType::Morning),
      shift(w, "2024-06-03", ShiftType::Off),
    ];
    let counts = count_by_type(&shifts);
    assert_eq!(
      counts,
      BTreeMap::from([
        (ShiftType::Morning, 2),
        (ShiftType::Evening, 0),
        (ShiftType::Night, 0),
        (ShiftType::Off, 1),
      ])
    );
    assert_eq!(counts.values().sum::<usize>(), shifts.len());
  }

  #[test]
  fn count_by_type_buckets_unknown() {
    let w = Uuid::new_v4();
    let shifts = vec![
      shift(w, "2024-06-01", ShiftType::parse_lenient("brunch")),
      shift(w, "2024-06-01", ShiftType::Night),
    ];
    let counts = count_by_type(&shifts);
    assert_eq!(counts[&ShiftType::Unknown], 1);
    assert_eq!(counts.values().sum::<usize>(), 2);
  }

  #[test]
  fn upcoming_for_worker_filters_and_truncates() {
    let john = Uuid::new_v4();
    let sarah = Uuid::new_v4();
    let shifts: Vec<_> = (1..=6)
      .map(|d| {
        let who = if d % 3 == 0 { sarah } else { john };
        shift(who, &format!("2024-06-0{d}"), ShiftType::Morning)
      })
      .collect();

    let upcoming = upcoming_for_worker(&shifts, john, 3);
    assert_eq!(upcoming.len(), 3);
    assert!(upcoming.iter().all(|s| s.worker_id == john));
    assert!(upcoming.windows(2).all(|w| w[0].shift_date <= w[1].shift_date));
    assert_eq!(upcoming_for_worker(&shifts, sarah, 10).len(), 2);
    assert!(upcoming_for_worker(&shifts, john, 0).is_empty());
  }

  #[test]
  fn distinct_counts_ignore_rest_days() {
    let john = Uuid::new_v4();
    let sarah = Uuid::new_v4();
    let farm = Uuid::new_v4();
    let shifts = vec![
      at_farm(shift(john, "2024-06-01", ShiftType::Morning), farm, "Dairy Farm A"),
      at_farm(shift(sarah, "2024-06-01", ShiftType::Evening), farm, "Dairy Farm A"),
      shift(sarah, "2024-06-02", ShiftType::Off),
    ];
    assert_eq!(distinct_worker_count(&shifts), 2);
    assert_eq!(distinct_farm_count(&shifts), 1);
  }

  #[test]
  fn stats_and_worker_summary() {
    let john = Uuid::new_v4();
    let farm = Uuid::new_v4();
    let mut done = at_farm(shift(john, "2024-06-01", ShiftType::Morning), farm, "Dairy Farm A");
    done.status = ShiftStatus::Completed;
    let shifts = vec![
      done,
      at_farm(shift(john, "2024-06-02", ShiftType::Night), farm, "Dairy Farm A"),
      shift(john, "2024-06-03", ShiftType::Off),
      shift(Uuid::new_v4(), "2024-06-03", ShiftType::Evening),
    ];

    let stats = shift_stats(&shifts);
    assert_eq!(stats.total_shifts, 4);
    assert_eq!(stats.active_workers, 2);
    assert_eq!(stats.farms_in_operation, 1);
    assert_eq!(stats.completion_rate, Some(0.25));
    assert_eq!(shift_stats(&[]).completion_rate, None);

    let summary = worker_summary(&shifts, john);
    assert_eq!(summary.total_shifts, 3);
    assert_eq!(summary.total_hours, 16.0);
    assert_eq!(summary.farms, 1);
  }

  #[test]
  fn events_on_matches_clicked_date() {
    let w = Uuid::new_v4();
    let events = to_calendar_events(&[
      shift(w, "2024-06-01", ShiftType::Morning),
      shift(w, "2024-06-02", ShiftType::Evening),
    ]);
    let clicked = events_on(&events, date("2024-06-02"));
    assert_eq!(clicked.len(), 1);
    assert_eq!(clicked[0].title, "John Doe - Evening");
    assert_eq!(shift_hours(&shift(w, "2024-06-02", ShiftType::Evening)), 8.0);
  }

  // ─── Properties ──────────────────────────────────────────────────────────

  mod properties {
    use proptest::{prelude::*, test_runner::Config};

    use super::*;

    const FARM: Uuid = Uuid::from_u128(100);

    fn worker(n: u128) -> Uuid { Uuid::from_u128(n + 1) }

    fn any_shift_type() -> impl Strategy<Value = ShiftType> {
      prop_oneof![
        Just(ShiftType::Morning),
        Just(ShiftType::Evening),
        Just(ShiftType::Night),
        Just(ShiftType::Off),
        Just(ShiftType::Unknown)
      ]
    }

    /// Unsorted shifts over three workers and sixty days from 2024-06-01.
    fn any_shifts() -> impl Strategy<Value = Vec<Shift>> {
      prop::collection::vec((0..3_u128, 0..60_i64, any_shift_type(), any::<bool>()), 0..40)
        .prop_map(|rows| {
          rows
            .into_iter()
            .map(|(w, offset, shift_type, farmed)| {
              let mut s = shift(worker(w), "2024-06-01", shift_type);
              s.shift_date += TimeDelta::days(offset);
              if farmed { at_farm(s, FARM, "Dairy Farm A") } else { s }
            })
            .collect()
        })
    }

    /// Whether `sub` appears in `of` in the same relative order.
    fn is_subsequence(sub: &[Shift], of: &[Shift]) -> bool {
      let mut rest = of.iter();
      sub.iter().all(|s| rest.any(|t| t.id == s.id))
    }

    proptest! {
      #![proptest_config(Config::with_cases(128))]

      #[test]
      fn every_shift_maps_to_one_event_in_its_type_color(shifts in any_shifts()) {
        let events = to_calendar_events(&shifts);
        prop_assert_eq!(events.len(), shifts.len());
        let table = ["#10b981", "#f59e0b", "#3b82f6", "#6b7280", "#8b5cf6"];
        for (event, shift) in events.iter().zip(&shifts) {
          prop_assert_eq!(event.id, shift.id);
          prop_assert_eq!(event.start, shift.shift_date);
          prop_assert_eq!(event.background_color.as_str(), shift_color(shift.shift_type));
          prop_assert!(table.contains(&event.background_color.as_str()));
        }
      }

      #[test]
      fn todays_shifts_is_the_ordered_subset_dated_today(
        shifts in any_shifts(),
        offset in 0..60_i64
      ) {
        let today = date("2024-06-01") + TimeDelta::days(offset);
        let todays = todays_shifts(&shifts, today);
        prop_assert!(todays.iter().all(|s| s.shift_date == today));
        prop_assert_eq!(todays.len(), shifts.iter().filter(|s| s.shift_date == today).count());
        prop_assert!(is_subsequence(&todays, &shifts));
      }

      #[test]
      fn type_counts_sum_to_total(shifts in any_shifts()) {
        let counts = count_by_type(&shifts);
        prop_assert_eq!(counts.values().sum::<usize>(), shifts.len());
        for known in ShiftType::KNOWN {
          prop_assert!(counts.contains_key(&known));
        }
        let any_unknown = shifts.iter().any(|s| s.shift_type == ShiftType::Unknown);
        prop_assert_eq!(counts.contains_key(&ShiftType::Unknown), any_unknown);
      }

      #[test]
      fn upcoming_for_worker_is_bounded_and_date_ordered(
        shifts in any_shifts(),
        w in 0..3_u128,
        limit in 0..10_usize
      ) {
        let mut shifts = shifts;
        shifts.sort_by_key(|s| s.shift_date);
        let worker_id = worker(w);
        let upcoming = upcoming_for_worker(&shifts, worker_id, limit);
        let theirs = shifts.iter().filter(|s| s.worker_id == worker_id).count();
        prop_assert_eq!(upcoming.len(), theirs.min(limit));
        prop_assert!(upcoming.iter().all(|s| s.worker_id == worker_id));
        prop_assert!(upcoming.windows(2).all(|p| p[0].shift_date <= p[1].shift_date));
        prop_assert!(is_subsequence(&upcoming, &shifts));
      }
    }
  }
}
