//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use uuid::Uuid;

use aqualog_core::{
  ledger::NewReading,
  profile::{NewProfile, ProfileUpdate},
  reward::{CATALOG, RewardKind},
  store::LedgerStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn profile_input(name: &str) -> NewProfile {
  NewProfile {
    name:             name.into(),
    password_hash:    "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
    address:          "12 Riverside Lane".into(),
    apartment_number: "4".into(),
    floor_number:     "2".into(),
    meter_serial:     "WM-20391".into(),
  }
}

fn reading(consumption: f64) -> NewReading {
  NewReading { consumption, recorded_at: Utc::now() }
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_profile() {
  let s = store().await;

  let profile = s.create_profile(profile_input("Alice")).await.unwrap();
  assert_eq!(profile.name, "Alice");

  let fetched = s.get_profile(profile.profile_id).await.unwrap().unwrap();
  assert_eq!(fetched.profile_id, profile.profile_id);
  assert_eq!(fetched.meter_serial, "WM-20391");
}

#[tokio::test]
async fn get_profile_missing_returns_none() {
  let s = store().await;
  let result = s.get_profile(Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn find_profile_by_name_is_case_insensitive() {
  let s = store().await;
  let created = s.create_profile(profile_input("Alice")).await.unwrap();

  let found = s.find_profile_by_name("aLiCe").await.unwrap().unwrap();
  assert_eq!(found.profile_id, created.profile_id);

  assert!(s.find_profile_by_name("Bob").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_name_errors_case_insensitively() {
  let s = store().await;
  s.create_profile(profile_input("Alice")).await.unwrap();

  let err = s.create_profile(profile_input("ALICE")).await.unwrap_err();
  assert!(matches!(err, crate::Error::NameTaken(_)));
}

#[tokio::test]
async fn update_profile_replaces_fields_and_keeps_password_when_absent() {
  let s = store().await;
  let created = s.create_profile(profile_input("Alice")).await.unwrap();

  let updated = s
    .update_profile(created.profile_id, ProfileUpdate {
      name:             "Alice".into(),
      password_hash:    None,
      address:          "7 Harbour Street".into(),
      apartment_number: "1".into(),
      floor_number:     "0".into(),
      meter_serial:     "WM-99999".into(),
    })
    .await
    .unwrap();

  assert_eq!(updated.address, "7 Harbour Street");
  assert_eq!(updated.password_hash, created.password_hash);
  assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn update_profile_rejects_name_collision() {
  let s = store().await;
  s.create_profile(profile_input("Alice")).await.unwrap();
  let bob = s.create_profile(profile_input("Bob")).await.unwrap();

  let err = s
    .update_profile(bob.profile_id, ProfileUpdate {
      name:             "alice".into(),
      password_hash:    None,
      address:          bob.address.clone(),
      apartment_number: bob.apartment_number.clone(),
      floor_number:     bob.floor_number.clone(),
      meter_serial:     bob.meter_serial.clone(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::NameTaken(_)));
}

#[tokio::test]
async fn update_missing_profile_errors() {
  let s = store().await;
  let err = s
    .update_profile(Uuid::new_v4(), ProfileUpdate {
      name:             "Ghost".into(),
      password_hash:    None,
      address:          String::new(),
      apartment_number: String::new(),
      floor_number:     String::new(),
      meter_serial:     String::new(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::ProfileNotFound(_)));
}

// ─── Readings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_readings_preserves_batch_order() {
  let s = store().await;
  let profile = s.create_profile(profile_input("Alice")).await.unwrap();

  let persisted = s
    .append_readings(profile.profile_id, vec![reading(100.0), reading(90.0)])
    .await
    .unwrap();
  assert_eq!(persisted.len(), 2);

  s.append_readings(profile.profile_id, vec![reading(95.0)])
    .await
    .unwrap();

  let history = s.list_readings(profile.profile_id).await.unwrap();
  let values: Vec<f64> = history.iter().map(|r| r.consumption).collect();
  assert_eq!(values, vec![100.0, 90.0, 95.0]);
}

#[tokio::test]
async fn readings_are_partitioned_per_profile() {
  let s = store().await;
  let alice = s.create_profile(profile_input("Alice")).await.unwrap();
  let bob = s.create_profile(profile_input("Bob")).await.unwrap();

  s.append_readings(alice.profile_id, vec![reading(10.0)])
    .await
    .unwrap();
  s.append_readings(bob.profile_id, vec![reading(20.0), reading(30.0)])
    .await
    .unwrap();

  assert_eq!(s.list_readings(alice.profile_id).await.unwrap().len(), 1);
  assert_eq!(s.list_readings(bob.profile_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn empty_ledger_lists_nothing() {
  let s = store().await;
  let profile = s.create_profile(profile_input("Alice")).await.unwrap();
  assert!(s.list_readings(profile.profile_id).await.unwrap().is_empty());
}

// ─── Rewards ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rewards_list_newest_first_and_count_tracks_appends() {
  let s = store().await;
  let profile = s.create_profile(profile_input("Alice")).await.unwrap();

  assert_eq!(s.reward_count(profile.profile_id).await.unwrap(), 0);

  let first = s
    .append_reward(profile.profile_id, CATALOG[0].instantiate(Utc::now()))
    .await
    .unwrap();
  let second = s
    .append_reward(profile.profile_id, CATALOG[1].instantiate(Utc::now()))
    .await
    .unwrap();

  assert_eq!(s.reward_count(profile.profile_id).await.unwrap(), 2);

  let listed = s.list_rewards(profile.profile_id).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].reward_id, second.reward_id);
  assert_eq!(listed[1].reward_id, first.reward_id);
}

#[tokio::test]
async fn reward_kind_roundtrips() {
  let s = store().await;
  let profile = s.create_profile(profile_input("Alice")).await.unwrap();

  s.append_reward(profile.profile_id, CATALOG[1].instantiate(Utc::now()))
    .await
    .unwrap();

  let listed = s.list_rewards(profile.profile_id).await.unwrap();
  assert_eq!(listed[0].kind, RewardKind::Coupon);
  assert_eq!(listed[0].title, CATALOG[1].title);
}
