//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by the SQLite backend (`farmshift-store-sqlite`)
//! and by the dashboard's HTTP client. Repositories depend on this
//! abstraction, never on a concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  farm::{Farm, FarmPatch, NewFarm},
  shift::{NewShift, Shift, ShiftPatch},
  worker::{NewWorker, Worker, WorkerPatch},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Filter for [`RecordStore::list_shifts`]. The default selects every shift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftQuery {
  /// Restrict to one worker's shifts.
  pub worker_id: Option<Uuid>,
  /// Inclusive lower bound on `shift_date`.
  pub from:      Option<NaiveDate>,
  /// Inclusive upper bound on `shift_date`.
  pub to:        Option<NaiveDate>,
}

impl ShiftQuery {
  pub fn for_worker(worker_id: Uuid) -> Self {
    Self { worker_id: Some(worker_id), ..Self::default() }
  }

  /// Whether `shift` falls inside this query. Stores that cannot filter
  /// server-side use this; repositories use it to decide what to cache.
  pub fn matches(&self, shift: &Shift) -> bool {
    self.worker_id.is_none_or(|w| w == shift.worker_id)
      && self.from.is_none_or(|d| shift.shift_date >= d)
      && self.to.is_none_or(|d| shift.shift_date <= d)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// CRUD over the three related tables: `farms`, `workers`, and `shifts`.
///
/// Shift reads are joined with their worker and farm. Updates and deletes
/// report a missing id through `Ok(None)` / `Ok(false)` rather than an error,
/// so callers can tell "not found" apart from a failed call. Referential
/// integrity (a shift's worker must exist) is the store's responsibility.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers and spawned tasks.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Farms ─────────────────────────────────────────────────────────────

  /// All farms, ascending by name.
  fn list_farms(&self) -> impl Future<Output = Result<Vec<Farm>, Self::Error>> + Send + '_;

  fn insert_farm(
    &self,
    input: NewFarm,
  ) -> impl Future<Output = Result<Farm, Self::Error>> + Send + '_;

  fn update_farm(
    &self,
    id: Uuid,
    patch: FarmPatch,
  ) -> impl Future<Output = Result<Option<Farm>, Self::Error>> + Send + '_;

  /// Returns `false` if no farm has this id.
  fn delete_farm(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Workers ───────────────────────────────────────────────────────────

  /// All workers, ascending by name.
  fn list_workers(
    &self,
  ) -> impl Future<Output = Result<Vec<Worker>, Self::Error>> + Send + '_;

  fn insert_worker(
    &self,
    input: NewWorker,
  ) -> impl Future<Output = Result<Worker, Self::Error>> + Send + '_;

  fn update_worker(
    &self,
    id: Uuid,
    patch: WorkerPatch,
  ) -> impl Future<Output = Result<Option<Worker>, Self::Error>> + Send + '_;

  fn delete_worker(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Shifts ────────────────────────────────────────────────────────────

  /// Shifts matching `query`, joined with worker and farm, ascending by date.
  fn list_shifts<'a>(
    &'a self,
    query: &'a ShiftQuery,
  ) -> impl Future<Output = Result<Vec<Shift>, Self::Error>> + Send + 'a;

  fn get_shift(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Shift>, Self::Error>> + Send + '_;

  /// Insert a shift and return it joined.
  fn insert_shift(
    &self,
    input: NewShift,
  ) -> impl Future<Output = Result<Shift, Self::Error>> + Send + '_;

  /// Apply `patch` and return the joined result, or `None` if `id` is unknown.
  fn update_shift(
    &self,
    id: Uuid,
    patch: ShiftPatch,
  ) -> impl Future<Output = Result<Option<Shift>, Self::Error>> + Send + '_;

  fn delete_shift(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
