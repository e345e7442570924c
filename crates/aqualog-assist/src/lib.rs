//! External AI collaborator for aqualog: conservation-tip generation,
//! meter-photo OCR, and a streaming chat assistant.
//!
//! Everything in here can fail without consequence for the rest of the
//! application — callers recover with fallback values or a scoped error
//! message, never a crash.

mod gemini;
pub mod tips;

use std::future::Future;

use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gemini::GeminiClient;
pub use tips::{FALLBACK_TIPS, TipCache};

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("transport error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("generation API returned an error: {0}")]
  Api(String),

  #[error("the model response was empty")]
  EmptyResponse,

  #[error("malformed response payload: {0}")]
  Json(#[from] serde_json::Error),

  /// The capability needs a configured API key and none was supplied.
  #[error("no API key configured")]
  MissingApiKey,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Chat transcript ─────────────────────────────────────────────────────────

/// Who authored a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
  User,
  Model,
}

/// One turn of the running conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role: ChatRole,
  pub text: String,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the hosted generation service.
///
/// All methods return `Send` futures so implementations can be shared across
/// an async runtime; the API layer is generic over this trait, so tests swap
/// in a canned advisor.
pub trait Advisor: Send + Sync {
  /// A batch of short, actionable water-saving tips.
  fn generate_tips(
    &self,
  ) -> impl Future<Output = Result<Vec<String>>> + Send + '_;

  /// Extract the numeric reading from a photo of a water meter.
  ///
  /// Returns an empty string when no reading could be determined — that is
  /// a user-visible input problem, not an error.
  fn read_meter<'a>(
    &'a self,
    image_base64: &'a str,
    mime_type: &'a str,
  ) -> impl Future<Output = Result<String>> + Send + 'a;

  /// Stream the assistant's reply to the latest turn of `messages`.
  fn chat(
    &self,
    messages: Vec<ChatMessage>,
  ) -> impl Future<Output = Result<BoxStream<'static, String>>> + Send + '_;
}
