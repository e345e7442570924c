//! User profiles — the per-user partition key for readings and rewards.
//!
//! A profile is created at sign-up, mutated only by profile update, and never
//! deleted. No two profiles may share a case-insensitive name; the storage
//! backend enforces that invariant.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A registered household account.
///
/// The password hash is an argon2 PHC string and is never serialised into
/// API responses.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
  pub profile_id:       Uuid,
  pub name:             String,
  #[serde(skip_serializing)]
  pub password_hash:    String,
  pub address:          String,
  pub apartment_number: String,
  pub floor_number:     String,
  /// Serial printed on the household water meter.
  pub meter_serial:     String,
  pub created_at:       DateTime<Utc>,
}

/// Input to [`crate::store::LedgerStore::create_profile`].
/// `profile_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewProfile {
  pub name:             String,
  pub password_hash:    String,
  pub address:          String,
  pub apartment_number: String,
  pub floor_number:     String,
  pub meter_serial:     String,
}

/// Input to [`crate::store::LedgerStore::update_profile`].
///
/// `password_hash` is `None` when the password is unchanged.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
  pub name:             String,
  pub password_hash:    Option<String>,
  pub address:          String,
  pub apartment_number: String,
  pub floor_number:     String,
  pub meter_serial:     String,
}
