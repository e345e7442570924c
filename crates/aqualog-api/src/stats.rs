//! Handler for `/profiles/:id/stats` — derived statistics for display.
//!
//! Everything here is recomputed from the ledger on each request; nothing is
//! cached or maintained incrementally.

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;

use aqualog_assist::Advisor;
use aqualog_core::{chart::ChartStats, ledger::UsageStats, store::LedgerStore};

use crate::{AppState, error::ApiError, profiles::require_profile};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
  pub usage:    UsageStats,
  /// `None` until the ledger has at least one reading.
  pub chart:    Option<ChartStats>,
  /// Ledger length, so clients can distinguish new users.
  pub readings: usize,
}

/// `GET /profiles/:id/stats`
pub async fn get_stats<S, A>(
  State(state): State<AppState<S, A>>,
  Path(profile_id): Path<Uuid>,
) -> Result<Json<StatsResponse>, ApiError>
where
  S: LedgerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  A: Advisor,
{
  require_profile(state.store.as_ref(), profile_id).await?;

  let history = state
    .store
    .list_readings(profile_id)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(StatsResponse {
    usage:    UsageStats::derive(&history),
    chart:    ChartStats::derive(&history),
    readings: history.len(),
  }))
}
