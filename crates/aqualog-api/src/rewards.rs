//! Handler for `/profiles/:id/rewards`.

use axum::{
  Json,
  extract::{Path, State},
};
use uuid::Uuid;

use aqualog_assist::Advisor;
use aqualog_core::{reward::Reward, store::LedgerStore};

use crate::{AppState, error::ApiError, profiles::require_profile};

/// `GET /profiles/:id/rewards` — most recent first.
pub async fn list<S, A>(
  State(state): State<AppState<S, A>>,
  Path(profile_id): Path<Uuid>,
) -> Result<Json<Vec<Reward>>, ApiError>
where
  S: LedgerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  A: Advisor,
{
  require_profile(state.store.as_ref(), profile_id).await?;

  let rewards = state
    .store
    .list_rewards(profile_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rewards))
}
