//! JSON REST API for aqualog.
//!
//! Exposes an axum [`Router`] backed by any [`aqualog_core::store::LedgerStore`]
//! and any [`aqualog_assist::Advisor`]. Transport auth and TLS are the
//! caller's responsibility.

pub mod chat;
pub mod error;
pub mod meter;
pub mod profiles;
pub mod readings;
pub mod rewards;
pub mod stats;
pub mod tips;

use std::{path::PathBuf, sync::Arc};

use aqualog_assist::{Advisor, TipCache};
use aqualog_core::store::LedgerStore;
use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

#[cfg(test)]
mod tests;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Server configuration, read from `config.toml` and `AQUALOG_*` environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// Key for the hosted generation API. Absent means canned fallbacks.
  #[serde(default)]
  pub gemini_api_key: Option<String>,
  #[serde(default = "default_model")]
  pub gemini_model:   String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("aqualog.db") }
fn default_model() -> String { "gemini-2.5-flash".to_owned() }

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared application state. Cloning is cheap — everything is `Arc`ed.
pub struct AppState<S, A> {
  pub store:   Arc<S>,
  pub advisor: Arc<A>,
  pub tips:    Arc<TipCache>,
}

impl<S, A> Clone for AppState<S, A> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      advisor: Arc::clone(&self.advisor),
      tips:    Arc::clone(&self.tips),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised router for the given state.
pub fn router<S, A>(state: AppState<S, A>) -> Router
where
  S: LedgerStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  A: Advisor + 'static,
{
  Router::new()
    // Profiles
    .route("/profiles/signup", post(profiles::sign_up::<S, A>))
    .route("/profiles/signin", post(profiles::sign_in::<S, A>))
    .route(
      "/profiles/{id}",
      get(profiles::get_one::<S, A>).put(profiles::update::<S, A>),
    )
    // Ledger
    .route(
      "/profiles/{id}/readings",
      get(readings::list::<S, A>).post(readings::submit::<S, A>),
    )
    .route("/profiles/{id}/rewards", get(rewards::list::<S, A>))
    .route("/profiles/{id}/stats", get(stats::get_stats::<S, A>))
    // Collaborator capabilities
    .route("/tips/daily", get(tips::daily::<S, A>))
    .route("/meter/read", post(meter::read::<S, A>))
    .route("/chat", post(chat::send::<S, A>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
