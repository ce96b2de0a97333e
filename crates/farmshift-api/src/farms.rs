//! Handlers for `/farms` endpoints.
//!
//! | Method   | Path          | Notes |
//! |----------|---------------|-------|
//! | `GET`    | `/farms`      | Ascending by name |
//! | `POST`   | `/farms`      | Body: `{"name":"…","location":"…","type":"…"}` |
//! | `PATCH`  | `/farms/:id`  | 404 if not found |
//! | `DELETE` | `/farms/:id`  | 404 if not found; 500 while shifts reference it |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use farmshift_core::{
  farm::{Farm, FarmPatch, NewFarm},
  store::RecordStore,
};
use uuid::Uuid;

use crate::{error::ApiError, require};

/// `GET /farms`
pub async fn list<S: RecordStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Farm>>, ApiError> {
  let farms = store.list_farms().await.map_err(ApiError::store)?;
  Ok(Json(farms))
}

/// `POST /farms`
pub async fn create<S: RecordStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewFarm>,
) -> Result<impl IntoResponse, ApiError> {
  require("name", &body.name)?;
  let farm = store.insert_farm(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(farm)))
}

/// `PATCH /farms/:id`
pub async fn update<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<FarmPatch>,
) -> Result<Json<Farm>, ApiError> {
  if let Some(name) = &patch.name {
    require("name", name)?;
  }
  let farm = store
    .update_farm(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("farm {id} not found")))?;
  Ok(Json(farm))
}

/// `DELETE /farms/:id`
pub async fn remove<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  if !store.delete_farm(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("farm {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}
