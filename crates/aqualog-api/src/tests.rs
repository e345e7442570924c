//! Handler tests against an in-memory SQLite store and a canned advisor.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use futures_util::{StreamExt as _, stream::BoxStream};
use uuid::Uuid;

use aqualog_assist::{Advisor, ChatMessage, ChatRole, Error as AssistError, TipCache};
use aqualog_core::{
  evaluator::Outcome,
  ledger::Submission,
  reward::{CATALOG, RewardKind},
  store::LedgerStore as _,
};
use aqualog_store_sqlite::SqliteStore;

use crate::{
  AppState, ApiError,
  chat::{self, ChatBody},
  meter::{self, ReadMeterBody},
  profiles::{self, SignInBody, SignUpBody, UpdateBody},
  readings, rewards, stats, tips,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

/// Deterministic advisor: fixed tips, configurable meter reply, chat chunks
/// when supplied and a transport failure otherwise.
struct CannedAdvisor {
  meter_reply: String,
  chat_chunks: Option<Vec<String>>,
}

impl Advisor for CannedAdvisor {
  async fn generate_tips(&self) -> aqualog_assist::Result<Vec<String>> {
    Ok(vec!["tip one".into(), "tip two".into(), "tip three".into()])
  }

  async fn read_meter(&self, _: &str, _: &str) -> aqualog_assist::Result<String> {
    Ok(self.meter_reply.clone())
  }

  async fn chat(
    &self,
    _: Vec<ChatMessage>,
  ) -> aqualog_assist::Result<BoxStream<'static, String>> {
    match &self.chat_chunks {
      Some(chunks) => Ok(futures_util::stream::iter(chunks.clone()).boxed()),
      None => Err(AssistError::MissingApiKey),
    }
  }
}

async fn state_with_advisor(advisor: CannedAdvisor) -> AppState<SqliteStore, CannedAdvisor> {
  AppState {
    store:   Arc::new(SqliteStore::open_in_memory().await.expect("store")),
    advisor: Arc::new(advisor),
    tips:    Arc::new(TipCache::new()),
  }
}

async fn state_with_meter(meter_reply: &str) -> AppState<SqliteStore, CannedAdvisor> {
  state_with_advisor(CannedAdvisor {
    meter_reply: meter_reply.into(),
    chat_chunks: None,
  })
  .await
}

async fn state() -> AppState<SqliteStore, CannedAdvisor> {
  state_with_meter("123.45").await
}

fn sign_up_body(name: &str) -> SignUpBody {
  SignUpBody {
    name:             name.into(),
    password:         "hunter2".into(),
    address:          "12 Riverside Lane".into(),
    apartment_number: "4".into(),
    floor_number:     "2".into(),
    meter_serial:     "WM-20391".into(),
  }
}

async fn sign_up(state: &AppState<SqliteStore, CannedAdvisor>, name: &str) -> Uuid {
  let (status, Json(profile)) =
    profiles::sign_up(State(state.clone()), Json(sign_up_body(name)))
      .await
      .expect("sign up");
  assert_eq!(status, StatusCode::CREATED);
  profile.profile_id
}

async fn submit(
  state: &AppState<SqliteStore, CannedAdvisor>,
  profile_id: Uuid,
  current: f64,
  previous: Option<f64>,
) -> Result<readings::SubmissionResponse, ApiError> {
  readings::submit(
    State(state.clone()),
    Path(profile_id),
    Json(Submission { current, previous }),
  )
  .await
  .map(|(_, Json(resp))| resp)
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sign_up_rejects_duplicate_names_case_insensitively() {
  let state = state().await;
  sign_up(&state, "Alice").await;

  let err = profiles::sign_up(State(state.clone()), Json(sign_up_body("ALICE")))
    .await
    .unwrap_err();
  assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn sign_in_succeeds_against_the_stored_hash() {
  let state = state().await;
  let id = sign_up(&state, "Alice").await;

  let Json(profile) = profiles::sign_in(
    State(state.clone()),
    Json(SignInBody { name: "alice".into(), password: "hunter2".into() }),
  )
  .await
  .expect("sign in");
  assert_eq!(profile.profile_id, id);
}

#[tokio::test]
async fn sign_in_failures_share_one_generic_error() {
  let state = state().await;
  sign_up(&state, "Alice").await;

  let wrong_password = profiles::sign_in(
    State(state.clone()),
    Json(SignInBody { name: "Alice".into(), password: "nope".into() }),
  )
  .await
  .unwrap_err();
  let unknown_name = profiles::sign_in(
    State(state.clone()),
    Json(SignInBody { name: "Mallory".into(), password: "nope".into() }),
  )
  .await
  .unwrap_err();

  assert!(matches!(wrong_password, ApiError::Unauthorized));
  assert!(matches!(unknown_name, ApiError::Unauthorized));
  assert_eq!(wrong_password.to_string(), unknown_name.to_string());
}

#[tokio::test]
async fn update_rename_onto_an_existing_name_conflicts() {
  let state = state().await;
  sign_up(&state, "Alice").await;
  let bob = sign_up(&state, "Bob").await;

  let err = profiles::update(
    State(state.clone()),
    Path(bob),
    Json(UpdateBody {
      name:             "alice".into(),
      password:         None,
      address:          "12 Riverside Lane".into(),
      apartment_number: "4".into(),
      floor_number:     "2".into(),
      meter_serial:     "WM-20391".into(),
    }),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, ApiError::Conflict(_)));
}

// ─── Submissions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn bootstrap_submission_with_major_reduction() {
  let state = state().await;
  let id = sign_up(&state, "Alice").await;

  // 50 → 40 is a 20% reduction.
  let resp = submit(&state, id, 40.0, Some(50.0)).await.unwrap();

  assert_eq!(resp.outcome, Outcome::SuccessSpecial);
  assert_eq!(resp.recorded.len(), 2);
  let reward = resp.reward.expect("reward earned");
  assert_eq!(reward.kind, RewardKind::Coupon);

  assert_eq!(resp.stats.last, 40.0);
  assert_eq!(resp.stats.previous, 50.0);
  assert_eq!(resp.stats.delta, 10.0);
  assert_eq!(resp.stats.delta_percent, 20.0);

  let Json(listed) = rewards::list(State(state.clone()), Path(id)).await.unwrap();
  assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn exactly_ten_percent_triggers_the_special_branch() {
  let state = state().await;
  let id = sign_up(&state, "Alice").await;

  let resp = submit(&state, id, 90.0, Some(100.0)).await.unwrap();
  assert_eq!(resp.outcome, Outcome::SuccessSpecial);
  assert_eq!(resp.recorded.len(), 2);
}

#[tokio::test]
async fn flat_consumption_is_a_warning_with_no_reward() {
  let state = state().await;
  let id = sign_up(&state, "Alice").await;

  submit(&state, id, 95.0, Some(100.0)).await.unwrap();
  let resp = submit(&state, id, 95.0, None).await.unwrap();

  assert_eq!(resp.outcome, Outcome::Warning);
  assert_eq!(resp.recorded.len(), 1);
  assert!(resp.reward.is_none());

  // The warning reading still lands in the ledger.
  let Json(history) = readings::list(State(state.clone()), Path(id)).await.unwrap();
  assert_eq!(history.len(), 3);

  let Json(listed) = rewards::list(State(state.clone()), Path(id)).await.unwrap();
  assert_eq!(listed.len(), 1); // from the first submission only
}

#[tokio::test]
async fn small_wins_cycle_through_the_catalog() {
  let state = state().await;
  let id = sign_up(&state, "Alice").await;

  let first = submit(&state, id, 99.0, Some(100.0)).await.unwrap();
  let second = submit(&state, id, 98.0, None).await.unwrap();
  let third = submit(&state, id, 97.0, None).await.unwrap();

  assert_eq!(first.reward.unwrap().title, CATALOG[0].title);
  assert_eq!(second.reward.unwrap().title, CATALOG[1].title);
  assert_eq!(third.reward.unwrap().title, CATALOG[2].title);
}

#[tokio::test]
async fn first_submission_without_baseline_mutates_nothing() {
  let state = state().await;
  let id = sign_up(&state, "Alice").await;

  let err = submit(&state, id, 40.0, None).await.unwrap_err();
  assert!(matches!(err, ApiError::Unprocessable(_)));

  let Json(history) = readings::list(State(state.clone()), Path(id)).await.unwrap();
  assert!(history.is_empty());
}

#[tokio::test]
async fn negative_consumption_mutates_nothing() {
  let state = state().await;
  let id = sign_up(&state, "Alice").await;

  let err = submit(&state, id, -3.0, Some(50.0)).await.unwrap_err();
  assert!(matches!(err, ApiError::Unprocessable(_)));

  let Json(history) = readings::list(State(state.clone()), Path(id)).await.unwrap();
  assert!(history.is_empty());
}

#[tokio::test]
async fn submitting_to_an_unknown_profile_is_not_found() {
  let state = state().await;
  let err = submit(&state, Uuid::new_v4(), 40.0, Some(50.0))
    .await
    .unwrap_err();
  assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn reads_for_an_unknown_profile_are_not_found() {
  let state = state().await;
  let id = Uuid::new_v4();

  let readings = readings::list(State(state.clone()), Path(id)).await.unwrap_err();
  let rewards = rewards::list(State(state.clone()), Path(id)).await.unwrap_err();
  let stats = stats::get_stats(State(state.clone()), Path(id)).await.unwrap_err();

  assert!(matches!(readings, ApiError::NotFound(_)));
  assert!(matches!(rewards, ApiError::NotFound(_)));
  assert!(matches!(stats, ApiError::NotFound(_)));
}

// ─── Statistics ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_expose_average_scale_and_highest() {
  let state = state().await;
  let id = sign_up(&state, "Alice").await;

  // Seed 10, 20, 30 directly through the store.
  for value in [10.0, 20.0, 30.0] {
    state
      .store
      .append_readings(id, vec![
        aqualog_core::ledger::NewReading::new(value, chrono::Utc::now()).unwrap(),
      ])
      .await
      .unwrap();
  }

  let Json(resp) = stats::get_stats(State(state.clone()), Path(id)).await.unwrap();
  assert_eq!(resp.readings, 3);

  let chart = resp.chart.unwrap();
  assert_eq!(chart.average, 20.0);
  assert_eq!(chart.scale_max, 30.0);
  assert_eq!(chart.highest, 2);
}

// ─── Collaborator endpoints ──────────────────────────────────────────────────

#[tokio::test]
async fn meter_read_returns_the_extracted_value() {
  let state = state_with_meter("123.45").await;
  let Json(resp) = meter::read(
    State(state.clone()),
    Json(ReadMeterBody { image_base64: "aGVsbG8=".into(), mime_type: "image/png".into() }),
  )
  .await
  .unwrap();
  assert_eq!(resp.reading, "123.45");
}

#[tokio::test]
async fn unreadable_meter_image_is_a_scoped_error() {
  let state = state_with_meter("").await;
  let err = meter::read(
    State(state.clone()),
    Json(ReadMeterBody { image_base64: "aGVsbG8=".into(), mime_type: "image/png".into() }),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, ApiError::Unprocessable(_)));
}

#[tokio::test]
async fn malformed_base64_is_rejected_before_the_advisor_runs() {
  let state = state().await;
  let err = meter::read(
    State(state.clone()),
    Json(ReadMeterBody { image_base64: "!!not-base64!!".into(), mime_type: "image/png".into() }),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn chat_streams_the_advisor_chunks_in_order() {
  let state = state_with_advisor(CannedAdvisor {
    meter_reply: "123.45".into(),
    chat_chunks: Some(vec!["Fix ".into(), "that ".into(), "leak.".into()]),
  })
  .await;

  let resp = chat::send(
    State(state.clone()),
    Json(ChatBody {
      messages: vec![ChatMessage {
        role: ChatRole::User,
        text: "How do I save water?".into(),
      }],
    }),
  )
  .await;

  assert_eq!(resp.status(), StatusCode::OK);
  let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  assert_eq!(body.as_ref(), b"Fix that leak.");
}

#[tokio::test]
async fn chat_transport_failure_degrades_to_a_single_fallback_chunk() {
  let state = state().await;

  let resp = chat::send(
    State(state.clone()),
    Json(ChatBody {
      messages: vec![ChatMessage { role: ChatRole::User, text: "Hello".into() }],
    }),
  )
  .await;

  assert_eq!(resp.status(), StatusCode::OK);
  let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  assert_eq!(body.as_ref(), chat::FALLBACK_REPLY.as_bytes());
}

#[tokio::test]
async fn daily_tip_comes_from_the_advisor_list() {
  let state = state().await;
  let Json(resp) = tips::daily(State(state.clone())).await;
  let tip = resp.tip.expect("a tip");
  assert!(["tip one", "tip two", "tip three"].contains(&tip.as_str()));
}
