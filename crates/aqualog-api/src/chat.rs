//! Handler for `/chat` — streaming assistant replies.
//!
//! The reply streams as plain text chunks. A transport failure degrades to a
//! single apologetic chunk rather than an error status, so the client's
//! transcript handling stays uniform.

use std::convert::Infallible;

use axum::{
  Json,
  body::Body,
  extract::State,
  http::header,
  response::{IntoResponse, Response},
};
use futures_util::StreamExt as _;
use serde::Deserialize;

use aqualog_assist::{Advisor, ChatMessage};
use aqualog_core::store::LedgerStore;

use crate::AppState;

pub(crate) const FALLBACK_REPLY: &str =
  "Sorry, I'm having trouble connecting right now. Please try again later.";

#[derive(Debug, Deserialize)]
pub struct ChatBody {
  /// The running conversation; the last message is the turn to answer.
  pub messages: Vec<ChatMessage>,
}

/// `POST /chat`
pub async fn send<S, A>(
  State(state): State<AppState<S, A>>,
  Json(body): Json<ChatBody>,
) -> Response
where
  S: LedgerStore,
  A: Advisor,
{
  let body = match state.advisor.chat(body.messages).await {
    Ok(stream) => Body::from_stream(stream.map(Ok::<String, Infallible>)),
    Err(e) => {
      tracing::warn!("chat unavailable: {e}");
      Body::from(FALLBACK_REPLY)
    }
  };

  (
    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
    body,
  )
    .into_response()
}
