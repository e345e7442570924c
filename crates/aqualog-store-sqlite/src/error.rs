//! Error type for `aqualog-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] aqualog_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown reward kind: {0:?}")]
  UnknownRewardKind(String),

  /// Sign-up or rename collided with an existing case-insensitive name.
  #[error("a profile named {0:?} already exists")]
  NameTaken(String),

  #[error("profile not found: {0}")]
  ProfileNotFound(uuid::Uuid),
}

impl aqualog_core::store::StoreError for Error {
  fn is_name_taken(&self) -> bool { matches!(self, Self::NameTaken(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
