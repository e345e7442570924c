//! Error types for `aqualog-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  /// Sign-up attempted with a name already taken (case-insensitive).
  #[error("a profile named {0:?} already exists")]
  NameTaken(String),

  /// Sign-in credential mismatch. Deliberately does not distinguish
  /// "unknown name" from "wrong password".
  #[error("invalid name or password")]
  InvalidCredentials,

  /// Consumption values must be finite and non-negative. Rejected before
  /// any state mutation.
  #[error("invalid consumption value: {0}")]
  InvalidConsumption(f64),

  /// A first submission must carry both a previous and a current reading.
  #[error("a first submission requires a previous-month reading")]
  MissingBaseline,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
