//! The `LedgerStore` trait.
//!
//! Implemented by storage backends (e.g. `aqualog-store-sqlite`). Higher
//! layers depend on this abstraction, not on any concrete backend, so the
//! storage engine is swappable without touching the evaluator or the ledger
//! logic.

use std::future::Future;

use uuid::Uuid;

use crate::{
  ledger::{NewReading, Reading},
  profile::{NewProfile, Profile, ProfileUpdate},
  reward::{NewReward, Reward},
};

/// Classification of backend errors, so transport layers can map storage
/// failures onto user-facing statuses without naming a concrete backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// Whether the error is the case-insensitive name-uniqueness constraint
  /// firing on a profile create or rename.
  fn is_name_taken(&self) -> bool;
}

/// Abstraction over an aqualog storage backend.
///
/// Readings and rewards are strictly append-only; profiles may be updated
/// but never deleted. All methods return `Send` futures so the trait can be
/// used in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LedgerStore: Send + Sync {
  type Error: StoreError;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Create and persist a new profile. Fails if the name is already taken
  /// case-insensitively.
  fn create_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// Retrieve a profile by id. Returns `None` if not found.
  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Look up a profile by name, case-insensitively.
  fn find_profile_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// Replace a profile's mutable fields. Fails if the new name collides
  /// with another profile.
  fn update_profile(
    &self,
    id: Uuid,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  // ── Readings — append-only writes ─────────────────────────────────────

  /// Append a batch of readings to the end of the profile's ledger,
  /// preserving the batch order. Returns the persisted readings.
  fn append_readings(
    &self,
    profile_id: Uuid,
    batch: Vec<NewReading>,
  ) -> impl Future<Output = Result<Vec<Reading>, Self::Error>> + Send + '_;

  /// The full ledger for a profile, in append order.
  fn list_readings(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Reading>, Self::Error>> + Send + '_;

  // ── Rewards — append-only writes ──────────────────────────────────────

  /// Append one earned reward.
  fn append_reward(
    &self,
    profile_id: Uuid,
    input: NewReward,
  ) -> impl Future<Output = Result<Reward, Self::Error>> + Send + '_;

  /// All rewards for a profile, most recent first.
  fn list_rewards(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Reward>, Self::Error>> + Send + '_;

  /// Number of rewards earned so far — the round-robin cursor.
  fn reward_count(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
