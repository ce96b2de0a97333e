//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use farmshift_core::{
  farm::{Farm, FarmPatch, NewFarm},
  shift::{NewShift, Shift, ShiftPatch},
  store::{RecordStore, ShiftQuery},
  worker::{NewWorker, Worker, WorkerPatch},
};

use crate::{
  encode::{
    encode_date, encode_dt, encode_shift_type, encode_time, encode_uuid, RawFarm,
    RawShift, RawWorker, FARM_COLUMNS, SHIFT_SELECT, WORKER_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A FarmShift record store backed by a single SQLite file.
///
/// Clones share one background connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a fresh in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema ready");
    Ok(())
  }

  async fn get_farm(&self, id: Uuid) -> Result<Option<Farm>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {FARM_COLUMNS} FROM farms WHERE id = ?1"),
            rusqlite::params![id_str],
            RawFarm::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawFarm::into_farm).transpose()
  }

  async fn get_worker(&self, id: Uuid) -> Result<Option<Worker>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {WORKER_COLUMNS} FROM workers WHERE id = ?1"),
            rusqlite::params![id_str],
            RawWorker::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawWorker::into_worker).transpose()
  }
}

/// The column values of a shift write, in `shifts` column order.
struct ShiftColumns {
  worker_id:  String,
  farm_id:    Option<String>,
  shift_date: String,
  shift_type: String,
  start_time: Option<String>,
  end_time:   Option<String>,
  notes:      Option<String>,
  status:     String,
}

impl ShiftColumns {
  fn encode(input: &NewShift) -> Self {
    Self {
      worker_id:  encode_uuid(input.worker_id),
      farm_id:    input.farm_id.map(encode_uuid),
      shift_date: encode_date(input.shift_date),
      shift_type: encode_shift_type(input.shift_type),
      start_time: input.start_time.map(encode_time),
      end_time:   input.end_time.map(encode_time),
      notes:      input.notes.clone(),
      status:     input.status.to_string(),
    }
  }
}

fn select_shift(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<RawShift>> {
  conn
    .query_row(
      &format!("{SHIFT_SELECT} WHERE s.id = ?1"),
      rusqlite::params![id],
      RawShift::from_row,
    )
    .optional()
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Farms ─────────────────────────────────────────────────────────────────

  async fn list_farms(&self) -> Result<Vec<Farm>> {
    let raws: Vec<RawFarm> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {FARM_COLUMNS} FROM farms ORDER BY name, created_at"))?;
        let rows = stmt
          .query_map([], RawFarm::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawFarm::into_farm).collect()
  }

  async fn insert_farm(&self, input: NewFarm) -> Result<Farm> {
    let farm = Farm {
      id:         Uuid::new_v4(),
      name:       input.name,
      location:   input.location,
      farm_type:  input.farm_type,
      created_at: Utc::now().trunc_subsecs(6),
    };

    let id_str   = encode_uuid(farm.id);
    let at_str   = encode_dt(farm.created_at);
    let name     = farm.name.clone();
    let location = farm.location.clone();
    let kind     = farm.farm_type.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO farms (id, name, location, type, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, location, kind, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(farm)
  }

  async fn update_farm(&self, id: Uuid, patch: FarmPatch) -> Result<Option<Farm>> {
    let Some(mut farm) = self.get_farm(id).await? else {
      return Ok(None);
    };
    patch.apply_to(&mut farm);

    let id_str   = encode_uuid(id);
    let name     = farm.name.clone();
    let location = farm.location.clone();
    let kind     = farm.farm_type.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE farms SET name = ?2, location = ?3, type = ?4 WHERE id = ?1",
          rusqlite::params![id_str, name, location, kind],
        )?)
      })
      .await?;

    Ok((changed > 0).then_some(farm))
  }

  async fn delete_farm(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM farms WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(deleted > 0)
  }

  // ── Workers ───────────────────────────────────────────────────────────────

  async fn list_workers(&self) -> Result<Vec<Worker>> {
    let raws: Vec<RawWorker> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {WORKER_COLUMNS} FROM workers ORDER BY name, created_at"))?;
        let rows = stmt
          .query_map([], RawWorker::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawWorker::into_worker).collect()
  }

  async fn insert_worker(&self, input: NewWorker) -> Result<Worker> {
    let worker = Worker {
      id:         Uuid::new_v4(),
      name:       input.name,
      email:      input.email,
      phone:      input.phone,
      created_at: Utc::now().trunc_subsecs(6),
    };

    let id_str = encode_uuid(worker.id);
    let at_str = encode_dt(worker.created_at);
    let name   = worker.name.clone();
    let email  = worker.email.clone();
    let phone  = worker.phone.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO workers (id, name, email, phone, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, email, phone, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(worker)
  }

  async fn update_worker(&self, id: Uuid, patch: WorkerPatch) -> Result<Option<Worker>> {
    let Some(mut worker) = self.get_worker(id).await? else {
      return Ok(None);
    };
    patch.apply_to(&mut worker);

    let id_str = encode_uuid(id);
    let name   = worker.name.clone();
    let email  = worker.email.clone();
    let phone  = worker.phone.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE workers SET name = ?2, email = ?3, phone = ?4 WHERE id = ?1",
          rusqlite::params![id_str, name, email, phone],
        )?)
      })
      .await?;

    Ok((changed > 0).then_some(worker))
  }

  async fn delete_worker(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM workers WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(deleted > 0)
  }

  // ── Shifts ────────────────────────────────────────────────────────────────

  async fn list_shifts(&self, query: &ShiftQuery) -> Result<Vec<Shift>> {
    let worker_str = query.worker_id.map(encode_uuid);
    let from_str   = query.from.map(encode_date);
    let to_str     = query.to.map(encode_date);

    let raws: Vec<RawShift> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{SHIFT_SELECT}
           WHERE (?1 IS NULL OR s.worker_id = ?1)
             AND (?2 IS NULL OR s.shift_date >= ?2)
             AND (?3 IS NULL OR s.shift_date <= ?3)
           ORDER BY s.shift_date, s.created_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![worker_str, from_str, to_str], RawShift::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawShift::into_shift).collect()
  }

  async fn get_shift(&self, id: Uuid) -> Result<Option<Shift>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_shift(conn, &id_str)?))
      .await?;
    raw.map(RawShift::into_shift).transpose()
  }

  async fn insert_shift(&self, input: NewShift) -> Result<Shift> {
    let id_str = encode_uuid(Uuid::new_v4());
    let at_str = encode_dt(Utc::now());
    let cols   = ShiftColumns::encode(&input);

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO shifts (
             id, worker_id, farm_id, shift_date, shift_type,
             start_time, end_time, notes, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            cols.worker_id,
            cols.farm_id,
            cols.shift_date,
            cols.shift_type,
            cols.start_time,
            cols.end_time,
            cols.notes,
            cols.status,
            at_str,
          ],
        )?;
        Ok(conn.query_row(
          &format!("{SHIFT_SELECT} WHERE s.id = ?1"),
          rusqlite::params![id_str],
          RawShift::from_row,
        )?)
      })
      .await?;

    raw.into_shift()
  }

  async fn update_shift(&self, id: Uuid, patch: ShiftPatch) -> Result<Option<Shift>> {
    let Some(current) = self.get_shift(id).await? else {
      return Ok(None);
    };
    let mut input = current.input();
    patch.apply_to(&mut input);

    let id_str = encode_uuid(id);
    let cols   = ShiftColumns::encode(&input);

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE shifts SET
             worker_id = ?2, farm_id = ?3, shift_date = ?4, shift_type = ?5,
             start_time = ?6, end_time = ?7, notes = ?8, status = ?9
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            cols.worker_id,
            cols.farm_id,
            cols.shift_date,
            cols.shift_type,
            cols.start_time,
            cols.end_time,
            cols.notes,
            cols.status,
          ],
        )?;
        Ok(select_shift(conn, &id_str)?)
      })
      .await?;

    raw.map(RawShift::into_shift).transpose()
  }

  async fn delete_shift(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM shifts WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(deleted > 0)
  }
}
