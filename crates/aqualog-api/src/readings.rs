//! Handlers for the consumption ledger.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/profiles/:id/readings` | Submit a reading; body [`Submission`] |
//! | `GET`  | `/profiles/:id/readings` | Full ledger in append order |
//!
//! The submit flow is the heart of the application: validate → evaluate →
//! append reading(s) → append the earned reward, then report fresh usage
//! statistics.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use aqualog_assist::Advisor;
use aqualog_core::{
  Error as CoreError, evaluator,
  evaluator::Outcome,
  ledger::{Reading, Submission, UsageStats},
  reward::Reward,
  store::LedgerStore,
};

use crate::{AppState, error::ApiError, profiles::require_profile};

// ─── Submit ──────────────────────────────────────────────────────────────────

/// What one submission produced.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
  pub outcome:  Outcome,
  /// Readings appended by this submission (two on bootstrap, else one).
  pub recorded: Vec<Reading>,
  /// The reward earned, if the outcome carried one.
  pub reward:   Option<Reward>,
  pub stats:    UsageStats,
}

/// `POST /profiles/:id/readings` — body: `{"current": 40.0, "previous": 50.0}`
/// (`previous` only on the first submission).
pub async fn submit<S, A>(
  State(state): State<AppState<S, A>>,
  Path(profile_id): Path<Uuid>,
  Json(submission): Json<Submission>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError>
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

  // All validation happens before any write; a rejected submission has no
  // partial effects.
  let now = Utc::now();
  let plan = submission.plan(history.is_empty(), now)?;

  let previous = match history.last() {
    Some(last) => last.consumption,
    None => submission.previous.ok_or(CoreError::MissingBaseline)?,
  };

  let rewards_so_far = state
    .store
    .reward_count(profile_id)
    .await
    .map_err(ApiError::store)?;

  let decision = evaluator::evaluate(submission.current, previous, rewards_so_far, now);

  let recorded = state
    .store
    .append_readings(profile_id, plan)
    .await
    .map_err(ApiError::store)?;

  let reward = match decision.reward {
    Some(new_reward) => Some(
      state
        .store
        .append_reward(profile_id, new_reward)
        .await
        .map_err(ApiError::store)?,
    ),
    None => None,
  };

  tracing::info!(
    %profile_id,
    outcome = ?decision.outcome,
    readings = recorded.len(),
    "submission evaluated"
  );

  let mut full_history = history;
  full_history.extend(recorded.iter().cloned());
  let stats = UsageStats::derive(&full_history);

  Ok((
    StatusCode::CREATED,
    Json(SubmissionResponse { outcome: decision.outcome, recorded, reward, stats }),
  ))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /profiles/:id/readings`
pub async fn list<S, A>(
  State(state): State<AppState<S, A>>,
  Path(profile_id): Path<Uuid>,
) -> Result<Json<Vec<Reading>>, ApiError>
where
  S: LedgerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  A: Advisor,
{
  require_profile(state.store.as_ref(), profile_id).await?;

  let readings = state
    .store
    .list_readings(profile_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(readings))
}
