//! Handlers for `/workers` endpoints.
//!
//! | Method   | Path            | Notes |
//! |----------|-----------------|-------|
//! | `GET`    | `/workers`      | Ascending by name |
//! | `POST`   | `/workers`      | Body: `{"name":"…","email":"…","phone":"…"}` |
//! | `PATCH`  | `/workers/:id`  | 404 if not found |
//! | `DELETE` | `/workers/:id`  | 404 if not found; 500 while shifts reference it |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use farmshift_core::{
  store::RecordStore,
  worker::{NewWorker, Worker, WorkerPatch},
};
use uuid::Uuid;

use crate::{error::ApiError, require};

/// `GET /workers`
pub async fn list<S: RecordStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Worker>>, ApiError> {
  let workers = store.list_workers().await.map_err(ApiError::store)?;
  Ok(Json(workers))
}

/// `POST /workers`
pub async fn create<S: RecordStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewWorker>,
) -> Result<impl IntoResponse, ApiError> {
  require("name", &body.name)?;
  let worker = store.insert_worker(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(worker)))
}

/// `PATCH /workers/:id`
pub async fn update<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<WorkerPatch>,
) -> Result<Json<Worker>, ApiError> {
  if let Some(name) = &patch.name {
    require("name", name)?;
  }
  let worker = store
    .update_worker(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("worker {id} not found")))?;
  Ok(Json(worker))
}

/// `DELETE /workers/:id`
pub async fn remove<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  if !store.delete_worker(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("worker {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}
