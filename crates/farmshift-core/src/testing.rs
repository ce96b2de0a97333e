//! In-memory [`RecordStore`]s for repository and form tests.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::{
  farm::{Farm, FarmPatch, NewFarm},
  shift::{FarmRef, NewShift, Shift, ShiftPatch, WorkerRef},
  store::{RecordStore, ShiftQuery},
  worker::{NewWorker, Worker, WorkerPatch},
};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MemoryError(String);

#[derive(Default)]
struct Tables {
  farms:     Vec<Farm>,
  workers:   Vec<Worker>,
  shifts:    Vec<(Uuid, NewShift)>,
  fail_next: Option<String>,
}

impl Tables {
  fn check(&mut self) -> Result<(), MemoryError> {
    match self.fail_next.take() {
      Some(msg) => Err(MemoryError(msg)),
      None => Ok(()),
    }
  }

  fn join(&self, id: Uuid, row: &NewShift) -> Result<Shift, MemoryError> {
    let worker = self
      .workers
      .iter()
      .find(|w| w.id == row.worker_id)
      .ok_or_else(|| MemoryError(format!("foreign key violation: worker {}", row.worker_id)))?;
    let farm = match row.farm_id {
      Some(farm_id) => Some(
        self
          .farms
          .iter()
          .find(|f| f.id == farm_id)
          .ok_or_else(|| MemoryError(format!("foreign key violation: farm {farm_id}")))?,
      ),
      None => None,
    };
    Ok(Shift {
      id,
      worker_id: row.worker_id,
      farm_id: row.farm_id,
      shift_date: row.shift_date,
      shift_type: row.shift_type,
      start_time: row.start_time,
      end_time: row.end_time,
      notes: row.notes.clone(),
      status: row.status,
      worker: WorkerRef { name: worker.name.clone(), email: worker.email.clone() },
      farm: farm.map(|f| FarmRef { name: f.name.clone(), location: f.location.clone() }),
    })
  }
}

/// A record store held in a mutex. `fail_next` makes the next call fail.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  pub fn fail_next(&self, message: &str) {
    self.tables.lock().unwrap().fail_next = Some(message.to_owned());
  }
}

impl RecordStore for MemoryStore {
  type Error = MemoryError;

  async fn list_farms(&self) -> Result<Vec<Farm>, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    let mut farms = t.farms.clone();
    farms.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(farms)
  }

  async fn insert_farm(&self, input: NewFarm) -> Result<Farm, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    let farm = Farm {
      id:         Uuid::new_v4(),
      name:       input.name,
      location:   input.location,
      farm_type:  input.farm_type,
      created_at: Utc::now(),
    };
    t.farms.push(farm.clone());
    Ok(farm)
  }

  async fn update_farm(&self, id: Uuid, patch: FarmPatch) -> Result<Option<Farm>, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    Ok(t.farms.iter_mut().find(|f| f.id == id).map(|f| {
      patch.apply_to(f);
      f.clone()
    }))
  }

  async fn delete_farm(&self, id: Uuid) -> Result<bool, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    if t.shifts.iter().any(|(_, s)| s.farm_id == Some(id)) {
      return Err(MemoryError(format!("farm {id} is referenced by shifts")));
    }
    let before = t.farms.len();
    t.farms.retain(|f| f.id != id);
    Ok(t.farms.len() != before)
  }

  async fn list_workers(&self) -> Result<Vec<Worker>, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    let mut workers = t.workers.clone();
    workers.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(workers)
  }

  async fn insert_worker(&self, input: NewWorker) -> Result<Worker, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    let worker = Worker {
      id:         Uuid::new_v4(),
      name:       input.name,
      email:      input.email,
      phone:      input.phone,
      created_at: Utc::now(),
    };
    t.workers.push(worker.clone());
    Ok(worker)
  }

  async fn update_worker(
    &self,
    id: Uuid,
    patch: WorkerPatch,
  ) -> Result<Option<Worker>, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    Ok(t.workers.iter_mut().find(|w| w.id == id).map(|w| {
      patch.apply_to(w);
      w.clone()
    }))
  }

  async fn delete_worker(&self, id: Uuid) -> Result<bool, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    if t.shifts.iter().any(|(_, s)| s.worker_id == id) {
      return Err(MemoryError(format!("worker {id} is referenced by shifts")));
    }
    let before = t.workers.len();
    t.workers.retain(|w| w.id != id);
    Ok(t.workers.len() != before)
  }

  async fn list_shifts(&self, query: &ShiftQuery) -> Result<Vec<Shift>, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    let mut shifts = t
      .shifts
      .iter()
      .map(|(id, row)| t.join(*id, row))
      .collect::<Result<Vec<_>, _>>()?;
    shifts.retain(|s| query.matches(s));
    shifts.sort_by_key(|s| s.shift_date);
    Ok(shifts)
  }

  async fn get_shift(&self, id: Uuid) -> Result<Option<Shift>, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    t.shifts
      .iter()
      .find(|(sid, _)| *sid == id)
      .map(|(sid, row)| t.join(*sid, row))
      .transpose()
  }

  async fn insert_shift(&self, input: NewShift) -> Result<Shift, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    let id = Uuid::new_v4();
    let shift = t.join(id, &input)?;
    t.shifts.push((id, input));
    Ok(shift)
  }

  async fn update_shift(&self, id: Uuid, patch: ShiftPatch) -> Result<Option<Shift>, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    let Some(pos) = t.shifts.iter().position(|(sid, _)| *sid == id) else {
      return Ok(None);
    };
    let mut row = t.shifts[pos].1.clone();
    patch.apply_to(&mut row);
    let shift = t.join(id, &row)?;
    t.shifts[pos].1 = row;
    Ok(Some(shift))
  }

  async fn delete_shift(&self, id: Uuid) -> Result<bool, MemoryError> {
    let mut t = self.tables.lock().unwrap();
    t.check()?;
    let before = t.shifts.len();
    t.shifts.retain(|(sid, _)| *sid != id);
    Ok(t.shifts.len() != before)
  }
}

// ─── Gated store ─────────────────────────────────────────────────────────────

/// Releases a parked `list_shifts` call.
pub struct Gate(Arc<Notify>);

impl Gate {
  pub fn release(&self) { self.0.notify_one(); }
}

/// Wraps a [`MemoryStore`] so a `list_shifts` call can be parked after it has
/// read the table, letting a test interleave other operations before its
/// result is delivered.
pub struct GatedStore {
  inner: Arc<MemoryStore>,
  held:  Mutex<Option<Arc<Notify>>>,
}

impl GatedStore {
  pub fn new(inner: Arc<MemoryStore>) -> Self { Self { inner, held: Mutex::new(None) } }

  /// Park the next `list_shifts` call until the returned gate is released.
  pub fn hold_next_list(&self) -> Gate {
    let notify = Arc::new(Notify::new());
    *self.held.lock().unwrap() = Some(notify.clone());
    Gate(notify)
  }
}

impl RecordStore for GatedStore {
  type Error = MemoryError;

  async fn list_farms(&self) -> Result<Vec<Farm>, MemoryError> { self.inner.list_farms().await }

  async fn insert_farm(&self, input: NewFarm) -> Result<Farm, MemoryError> {
    self.inner.insert_farm(input).await
  }

  async fn update_farm(&self, id: Uuid, patch: FarmPatch) -> Result<Option<Farm>, MemoryError> {
    self.inner.update_farm(id, patch).await
  }

  async fn delete_farm(&self, id: Uuid) -> Result<bool, MemoryError> {
    self.inner.delete_farm(id).await
  }

  async fn list_workers(&self) -> Result<Vec<Worker>, MemoryError> {
    self.inner.list_workers().await
  }

  async fn insert_worker(&self, input: NewWorker) -> Result<Worker, MemoryError> {
    self.inner.insert_worker(input).await
  }

  async fn update_worker(
    &self,
    id: Uuid,
    patch: WorkerPatch,
  ) -> Result<Option<Worker>, MemoryError> {
    self.inner.update_worker(id, patch).await
  }

  async fn delete_worker(&self, id: Uuid) -> Result<bool, MemoryError> {
    self.inner.delete_worker(id).await
  }

  async fn list_shifts(&self, query: &ShiftQuery) -> Result<Vec<Shift>, MemoryError> {
    let result = self.inner.list_shifts(query).await;
    let held = self.held.lock().unwrap().take();
    if let Some(notify) = held {
      notify.notified().await;
    }
    result
  }

  async fn get_shift(&self, id: Uuid) -> Result<Option<Shift>, MemoryError> {
    self.inner.get_shift(id).await
  }

  async fn insert_shift(&self, input: NewShift) -> Result<Shift, MemoryError> {
    self.inner.insert_shift(input).await
  }

  async fn update_shift(&self, id: Uuid, patch: ShiftPatch) -> Result<Option<Shift>, MemoryError> {
    self.inner.update_shift(id, patch).await
  }

  async fn delete_shift(&self, id: Uuid) -> Result<bool, MemoryError> {
    self.inner.delete_shift(id).await
  }
}
