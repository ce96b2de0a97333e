//! JSON REST API for FarmShift.
//!
//! Exposes an axum [`Router`] backed by any
//! [`farmshift_core::store::RecordStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", farmshift_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod farms;
pub mod shifts;
pub mod views;
pub mod workers;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch},
};
use farmshift_core::store::RecordStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Farms
    .route("/farms", get(farms::list::<S>).post(farms::create::<S>))
    .route("/farms/{id}", patch(farms::update::<S>).delete(farms::remove::<S>))
    // Workers
    .route("/workers", get(workers::list::<S>).post(workers::create::<S>))
    .route("/workers/{id}", patch(workers::update::<S>).delete(workers::remove::<S>))
    .route("/workers/{id}/upcoming", get(views::upcoming::<S>))
    // Shifts
    .route("/shifts", get(shifts::list::<S>).post(shifts::create::<S>))
    .route(
      "/shifts/{id}",
      get(shifts::get_one::<S>)
        .patch(shifts::update::<S>)
        .delete(shifts::remove::<S>),
    )
    // Derived views
    .route("/views/calendar", get(views::calendar::<S>))
    .route("/views/today", get(views::today::<S>))
    .route("/views/counts", get(views::counts::<S>))
    .route("/views/stats", get(views::stats::<S>))
    .with_state(store)
}

/// Reject a blank required text field.
pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
  if value.trim().is_empty() {
    return Err(ApiError::BadRequest(format!("{field} must not be empty")));
  }
  Ok(())
}
