//! Reward types and the static reward catalog.
//!
//! Rewards are append-only: instantiated once by the evaluator's decision,
//! never edited or removed. The catalog is an ordered immutable list so that
//! round-robin indexing is well-defined.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a reward is a decorative badge or a redeemable coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
  Badge,
  Coupon,
}

/// A reward earned by a profile. Listed most-recent-first for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
  pub reward_id:   Uuid,
  pub profile_id:  Uuid,
  pub title:       String,
  pub description: String,
  pub kind:        RewardKind,
  /// Emoji shown next to the reward.
  pub icon:        String,
  pub earned_at:   DateTime<Utc>,
}

/// Input to [`crate::store::LedgerStore::append_reward`].
/// `reward_id` is always set by the store.
#[derive(Debug, Clone)]
pub struct NewReward {
  pub title:       String,
  pub description: String,
  pub kind:        RewardKind,
  pub icon:        String,
  pub earned_at:   DateTime<Utc>,
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// A catalog entry describing a reward before instantiation.
#[derive(Debug, Clone, Copy)]
pub struct RewardTemplate {
  pub title:       &'static str,
  pub description: &'static str,
  pub kind:        RewardKind,
  pub icon:        &'static str,
}

impl RewardTemplate {
  /// Stamp the template into a concrete reward earned now.
  pub fn instantiate(&self, earned_at: DateTime<Utc>) -> NewReward {
    NewReward {
      title:       self.title.to_owned(),
      description: self.description.to_owned(),
      kind:        self.kind,
      icon:        self.icon.to_owned(),
      earned_at,
    }
  }
}

/// Rewards handed out round-robin for small reductions. Order matters.
pub const CATALOG: [RewardTemplate; 5] = [
  RewardTemplate {
    title:       "Eco-Warrior Badge",
    description: "Awarded for your first successful water reduction!",
    kind:        RewardKind::Badge,
    icon:        "🛡️",
  },
  RewardTemplate {
    title:       "5% Off Eco-Friendly Soap",
    description: "A coupon for our partner, \"Green Suds\".",
    kind:        RewardKind::Coupon,
    icon:        "🧼",
  },
  RewardTemplate {
    title:       "Splash Saver Medal",
    description: "You have consistently saved water. Keep it up!",
    kind:        RewardKind::Badge,
    icon:        "💧",
  },
  RewardTemplate {
    title:       "Garden Guru Discount",
    description: "10% off water-saving sprinklers.",
    kind:        RewardKind::Coupon,
    icon:        "🌱",
  },
  RewardTemplate {
    title:       "Conservation Champion",
    description: "You are a true hero for the planet!",
    kind:        RewardKind::Badge,
    icon:        "🏆",
  },
];

/// The fixed reward for cutting consumption by 10% or more.
pub const MAJOR_REDUCTION: RewardTemplate = RewardTemplate {
  title:       "Amazon Coupon!",
  description: "You reduced your consumption by over 10%!",
  kind:        RewardKind::Coupon,
  icon:        "📦",
};
