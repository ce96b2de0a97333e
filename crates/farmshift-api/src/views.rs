//! Read-only projections over the current shift list.
//!
//! | Method | Path                      | Notes |
//! |--------|---------------------------|-------|
//! | `GET`  | `/views/calendar`         | Calendar events; optional `?from=&to=` |
//! | `GET`  | `/views/today`            | `?date=` defaults to the server's local date |
//! | `GET`  | `/views/counts`           | Shifts per type, known types zero-filled |
//! | `GET`  | `/views/stats`            | Totals and completion rate |
//! | `GET`  | `/workers/:id/upcoming`   | `?limit=` (default 4), `?from=` |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::{Local, NaiveDate};
use farmshift_core::{
  shift::{Shift, ShiftType},
  store::{RecordStore, ShiftQuery},
  views::{self, CalendarEvent, ShiftStats},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// Matches the worker dashboard's "next shifts" card.
pub const DEFAULT_UPCOMING_LIMIT: usize = 4;

async fn all_shifts<S: RecordStore>(store: &S) -> Result<Vec<Shift>, ApiError> {
  store.list_shifts(&ShiftQuery::default()).await.map_err(ApiError::store)
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
}

/// `GET /views/calendar`
pub async fn calendar<S: RecordStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
  let query = ShiftQuery { worker_id: None, from: params.from, to: params.to };
  let shifts = store.list_shifts(&query).await.map_err(ApiError::store)?;
  Ok(Json(views::to_calendar_events(&shifts)))
}

#[derive(Debug, Deserialize)]
pub struct TodayParams {
  pub date: Option<NaiveDate>,
}

/// `GET /views/today`
pub async fn today<S: RecordStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<TodayParams>,
) -> Result<Json<Vec<Shift>>, ApiError> {
  let date = params.date.unwrap_or_else(|| Local::now().date_naive());
  let shifts = all_shifts(store.as_ref()).await?;
  Ok(Json(views::todays_shifts(&shifts, date)))
}

/// `GET /views/counts`
pub async fn counts<S: RecordStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<BTreeMap<ShiftType, usize>>, ApiError> {
  let shifts = all_shifts(store.as_ref()).await?;
  Ok(Json(views::count_by_type(&shifts)))
}

/// `GET /views/stats`
pub async fn stats<S: RecordStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<ShiftStats>, ApiError> {
  let shifts = all_shifts(store.as_ref()).await?;
  Ok(Json(views::shift_stats(&shifts)))
}

#[derive(Debug, Deserialize)]
pub struct UpcomingParams {
  pub limit: Option<usize>,
  pub from:  Option<NaiveDate>,
}

/// `GET /workers/:id/upcoming`
pub async fn upcoming<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(worker_id): Path<Uuid>,
  Query(params): Query<UpcomingParams>,
) -> Result<Json<Vec<Shift>>, ApiError> {
  let query = ShiftQuery { worker_id: Some(worker_id), from: params.from, to: None };
  let shifts = store.list_shifts(&query).await.map_err(ApiError::store)?;
  let limit = params.limit.unwrap_or(DEFAULT_UPCOMING_LIMIT);
  Ok(Json(views::upcoming_for_worker(&shifts, worker_id, limit)))
}
