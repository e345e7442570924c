//! Handler for `/meter/read` — photo-to-reading OCR via the collaborator.
//!
//! An unreadable image is a scoped 422, never a crash; the caller shows the
//! message inline and the user types the value instead.

use axum::{Json, extract::State};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Serialize};

use aqualog_assist::Advisor;
use aqualog_core::store::LedgerStore;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ReadMeterBody {
  pub image_base64: String,
  pub mime_type:    String,
}

#[derive(Debug, Serialize)]
pub struct ReadMeterResponse {
  /// Decimal string as read off the meter, e.g. `"123.456"`.
  pub reading: String,
}

/// `POST /meter/read`
pub async fn read<S, A>(
  State(state): State<AppState<S, A>>,
  Json(body): Json<ReadMeterBody>,
) -> Result<Json<ReadMeterResponse>, ApiError>
where
  S: LedgerStore,
  A: Advisor,
{
  if B64.decode(&body.image_base64).is_err() {
    return Err(ApiError::BadRequest("image data is not valid base64".into()));
  }

  let reading = state
    .advisor
    .read_meter(&body.image_base64, &body.mime_type)
    .await
    .map_err(|e| {
      tracing::warn!("meter OCR failed: {e}");
      ApiError::Unprocessable("could not read a meter value from the image".into())
    })?;

  // An empty or non-numeric reply means the model saw no reading.
  if reading.is_empty() || reading.parse::<f64>().is_err() {
    return Err(ApiError::Unprocessable(
      "could not read a meter value from the image".into(),
    ));
  }

  Ok(Json(ReadMeterResponse { reading }))
}
