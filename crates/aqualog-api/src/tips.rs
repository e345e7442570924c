//! Handler for `/tips/daily`.
//!
//! This endpoint never fails: a generation problem falls back to the built-in
//! tip list inside the cache, and the response shape does not change.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;

use aqualog_assist::{Advisor, tips::daily_tip};
use aqualog_core::store::LedgerStore;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TipResponse {
  pub tip: Option<String>,
}

/// `GET /tips/daily` — today's tip, rotated by day-of-month over the day's
/// cached list.
pub async fn daily<S, A>(State(state): State<AppState<S, A>>) -> Json<TipResponse>
where
  S: LedgerStore,
  A: Advisor,
{
  let tip = daily_tip(state.advisor.as_ref(), &state.tips, Utc::now()).await;
  Json(TipResponse { tip })
}
