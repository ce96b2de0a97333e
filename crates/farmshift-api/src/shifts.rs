//! Handlers for `/shifts` endpoints.
//!
//! | Method   | Path          | Notes |
//! |----------|---------------|-------|
//! | `GET`    | `/shifts`     | Optional `?worker_id=&from=&to=`; joined, by date |
//! | `POST`   | `/shifts`     | Body: a `NewShift`; 400 on an unknown type, worker or farm |
//! | `GET`    | `/shifts/:id` | 404 if not found |
//! | `PATCH`  | `/shifts/:id` | Body: a `ShiftPatch`; `null` clears a field; 400 as for `POST` |
//! | `DELETE` | `/shifts/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use farmshift_core::{
  shift::{NewShift, Shift, ShiftPatch, ShiftType},
  store::{RecordStore, ShiftQuery},
};
use uuid::Uuid;

use crate::error::ApiError;

fn known_type(shift_type: ShiftType) -> Result<(), ApiError> {
  if shift_type == ShiftType::Unknown {
    return Err(ApiError::BadRequest(format!(
      "shift_type must be one of {}",
      ShiftType::KNOWN.map(|t| t.to_string()).join(", ")
    )));
  }
  Ok(())
}

/// Check referenced rows exist, so a dangling id is the caller's mistake
/// (400) rather than a foreign-key failure in the store (500).
async fn known_references<S: RecordStore>(
  store: &S,
  worker_id: Option<Uuid>,
  farm_id: Option<Uuid>,
) -> Result<(), ApiError> {
  if let Some(id) = worker_id {
    let workers = store.list_workers().await.map_err(ApiError::store)?;
    if !workers.iter().any(|w| w.id == id) {
      return Err(ApiError::BadRequest(format!("worker {id} does not exist")));
    }
  }
  if let Some(id) = farm_id {
    let farms = store.list_farms().await.map_err(ApiError::store)?;
    if !farms.iter().any(|f| f.id == id) {
      return Err(ApiError::BadRequest(format!("farm {id} does not exist")));
    }
  }
  Ok(())
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /shifts[?worker_id=<uuid>&from=<date>&to=<date>]`
pub async fn list<S: RecordStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<ShiftQuery>,
) -> Result<Json<Vec<Shift>>, ApiError> {
  let shifts = store.list_shifts(&query).await.map_err(ApiError::store)?;
  Ok(Json(shifts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /shifts`
pub async fn create<S: RecordStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewShift>,
) -> Result<impl IntoResponse, ApiError> {
  known_type(body.shift_type)?;
  known_references(store.as_ref(), Some(body.worker_id), body.farm_id).await?;
  let shift = store.insert_shift(body).await.map_err(ApiError::store)?;
  tracing::debug!(shift_id = %shift.id, date = %shift.shift_date, "shift created");
  Ok((StatusCode::CREATED, Json(shift)))
}

// ─── Get / update / delete ────────────────────────────────────────────────────

/// `GET /shifts/:id`
pub async fn get_one<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Shift>, ApiError> {
  let shift = store
    .get_shift(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("shift {id} not found")))?;
  Ok(Json(shift))
}

/// `PATCH /shifts/:id`
pub async fn update<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<ShiftPatch>,
) -> Result<Json<Shift>, ApiError> {
  if let Some(shift_type) = patch.shift_type {
    known_type(shift_type)?;
  }
  known_references(store.as_ref(), patch.worker_id, patch.farm_id.flatten()).await?;
  let shift = store
    .update_shift(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("shift {id} not found")))?;
  Ok(Json(shift))
}

/// `DELETE /shifts/:id`
pub async fn remove<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  if !store.delete_shift(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("shift {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}
