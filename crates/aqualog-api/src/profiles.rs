//! Handlers for profile sign-up, sign-in, fetch, and update.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/profiles/signup` | 201 on success; 409 if the name is taken |
//! | `POST` | `/profiles/signin` | 401 with one generic message on mismatch |
//! | `GET`  | `/profiles/:id` | 404 if not found |
//! | `PUT`  | `/profiles/:id` | Password re-hashed only when supplied |

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use rand_core::OsRng;
use serde::Deserialize;
use uuid::Uuid;

use aqualog_assist::Advisor;
use aqualog_core::{
  profile::{NewProfile, Profile, ProfileUpdate},
  store::{LedgerStore, StoreError},
};

use crate::{AppState, error::ApiError};

/// 404 unless the profile exists.
pub(crate) async fn require_profile<S>(store: &S, id: Uuid) -> Result<(), ApiError>
where
  S: LedgerStore,
{
  if store.get_profile(id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::NotFound(format!("profile {id} not found")));
  }
  Ok(())
}

/// Map a storage failure, surfacing the name-uniqueness constraint as a 409.
/// The constraint is the authority on duplicates, so concurrent sign-ups
/// racing to the same name cannot slip past as a 500.
fn map_store_error<E: StoreError>(e: E) -> ApiError {
  if e.is_name_taken() {
    ApiError::Conflict(e.to_string())
  } else {
    ApiError::store(e)
  }
}

// ─── Password hashing ────────────────────────────────────────────────────────

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .map(|parsed| {
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    })
    .unwrap_or(false)
}

// ─── Sign up ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
  pub name:             String,
  pub password:         String,
  pub address:          String,
  pub apartment_number: String,
  pub floor_number:     String,
  pub meter_serial:     String,
}

/// `POST /profiles/signup`
pub async fn sign_up<S, A>(
  State(state): State<AppState<S, A>>,
  Json(body): Json<SignUpBody>,
) -> Result<(StatusCode, Json<Profile>), ApiError>
where
  S: LedgerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  A: Advisor,
{
  if body.name.trim().is_empty() || body.password.is_empty() {
    return Err(ApiError::BadRequest(
      "name and password must not be empty".into(),
    ));
  }

  let profile = state
    .store
    .create_profile(NewProfile {
      name:             body.name,
      password_hash:    hash_password(&body.password)?,
      address:          body.address,
      apartment_number: body.apartment_number,
      floor_number:     body.floor_number,
      meter_serial:     body.meter_serial,
    })
    .await
    .map_err(map_store_error)?;

  tracing::info!(profile_id = %profile.profile_id, "profile created");
  Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Sign in ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignInBody {
  pub name:     String,
  pub password: String,
}

/// `POST /profiles/signin` — credential mismatch of any kind yields the same
/// 401, so callers cannot enumerate registered names.
pub async fn sign_in<S, A>(
  State(state): State<AppState<S, A>>,
  Json(body): Json<SignInBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: LedgerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  A: Advisor,
{
  let profile = state
    .store
    .find_profile_by_name(&body.name)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  if !verify_password(&body.password, &profile.password_hash) {
    return Err(ApiError::Unauthorized);
  }

  Ok(Json(profile))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /profiles/:id`
pub async fn get_one<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError>
where
  S: LedgerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  A: Advisor,
{
  let profile = state
    .store
    .get_profile(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("profile {id} not found")))?;
  Ok(Json(profile))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub name:             String,
  /// `None` leaves the stored password unchanged.
  pub password:         Option<String>,
  pub address:          String,
  pub apartment_number: String,
  pub floor_number:     String,
  pub meter_serial:     String,
}

/// `PUT /profiles/:id`
pub async fn update<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: LedgerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  A: Advisor,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }

  require_profile(state.store.as_ref(), id).await?;

  let password_hash = body.password.as_deref().map(hash_password).transpose()?;

  // A rename onto another profile's name trips the store's uniqueness
  // constraint and comes back as a 409.
  let profile = state
    .store
    .update_profile(id, ProfileUpdate {
      name: body.name,
      password_hash,
      address: body.address,
      apartment_number: body.apartment_number,
      floor_number: body.floor_number,
      meter_serial: body.meter_serial,
    })
    .await
    .map_err(map_store_error)?;

  Ok(Json(profile))
}
