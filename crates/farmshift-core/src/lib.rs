//! Core types, repositories, and derived views for FarmShift.
//!
//! This crate is free of HTTP and database dependencies. Backends implement
//! [`store::RecordStore`]; dashboards build [`repository`] objects over one
//! and render [`views`] computed from their snapshots.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod auth;
pub mod error;
pub mod farm;
pub mod form;
pub mod recurrence;
pub mod repository;
pub mod shift;
pub mod store;
pub mod views;
pub mod worker;

mod nullable;

#[cfg(test)]
mod testing;

pub use error::{Error, Result, ValidationError};
