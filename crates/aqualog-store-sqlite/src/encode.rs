//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Reward kinds are stored as
//! lowercase text. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use aqualog_core::{
  ledger::Reading,
  profile::Profile,
  reward::{Reward, RewardKind},
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── RewardKind ──────────────────────────────────────────────────────────────

pub fn encode_reward_kind(k: RewardKind) -> &'static str {
  match k {
    RewardKind::Badge => "badge",
    RewardKind::Coupon => "coupon",
  }
}

pub fn decode_reward_kind(s: &str) -> Result<RewardKind> {
  match s {
    "badge" => Ok(RewardKind::Badge),
    "coupon" => Ok(RewardKind::Coupon),
    other => Err(Error::UnknownRewardKind(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub profile_id:       String,
  pub name:             String,
  pub password_hash:    String,
  pub address:          String,
  pub apartment_number: String,
  pub floor_number:     String,
  pub meter_serial:     String,
  pub created_at:       String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id:       decode_uuid(&self.profile_id)?,
      name:             self.name,
      password_hash:    self.password_hash,
      address:          self.address,
      apartment_number: self.apartment_number,
      floor_number:     self.floor_number,
      meter_serial:     self.meter_serial,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `readings` row.
pub struct RawReading {
  pub reading_id:  String,
  pub profile_id:  String,
  pub consumption: f64,
  pub recorded_at: String,
}

impl RawReading {
  pub fn into_reading(self) -> Result<Reading> {
    Ok(Reading {
      reading_id:  decode_uuid(&self.reading_id)?,
      profile_id:  decode_uuid(&self.profile_id)?,
      consumption: self.consumption,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `rewards` row.
pub struct RawReward {
  pub reward_id:   String,
  pub profile_id:  String,
  pub title:       String,
  pub description: String,
  pub kind:        String,
  pub icon:        String,
  pub earned_at:   String,
}

impl RawReward {
  pub fn into_reward(self) -> Result<Reward> {
    Ok(Reward {
      reward_id:   decode_uuid(&self.reward_id)?,
      profile_id:  decode_uuid(&self.profile_id)?,
      title:       self.title,
      description: self.description,
      kind:        decode_reward_kind(&self.kind)?,
      icon:        self.icon,
      earned_at:   decode_dt(&self.earned_at)?,
    })
  }
}
