//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Rejected input; no state was mutated.
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  /// Deliberately message-free beyond the generic text, so sign-in failures
  /// do not reveal whether the name exists.
  #[error("invalid name or password")]
  Unauthorized,

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  /// Wrap a storage-backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl From<aqualog_core::Error> for ApiError {
  fn from(e: aqualog_core::Error) -> Self {
    use aqualog_core::Error as Core;
    match e {
      Core::InvalidConsumption(_) | Core::MissingBaseline => {
        Self::Unprocessable(e.to_string())
      }
      Core::NameTaken(_) => Self::Conflict(e.to_string()),
      Core::InvalidCredentials => Self::Unauthorized,
      Core::ProfileNotFound(_) => Self::NotFound(e.to_string()),
      Core::Serialization(_) => Self::Internal(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
