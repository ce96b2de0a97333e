//! Error types for `farmshift-core`.

use thiserror::Error;
use uuid::Uuid;

/// A required form field that was left empty or could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("please fill in all required fields (missing: {})", .0.join(", "))]
  MissingFields(Vec<&'static str>),

  #[error("invalid {field}: {value:?}")]
  Invalid { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum Error {
  /// Any failed record-store call: network, database, or server-side.
  #[error("{0}")]
  Backend(String),

  /// A mutation targeted an id the store does not know.
  #[error("record not found: {0}")]
  NotFound(Uuid),

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("authentication failed: {0}")]
  Authentication(String),
}

impl Error {
  /// Wrap any store error as [`Error::Backend`], keeping only its message.
  pub fn backend(err: impl std::error::Error) -> Self { Self::Backend(err.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
