//! The reward evaluator — a pure decision function over a new reading, the
//! prior reading, and the number of rewards earned so far.
//!
//! Each submission is evaluated fresh; no state is carried between calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reward::{CATALOG, MAJOR_REDUCTION, NewReward, RewardTemplate};

/// Fractional reduction at or above which the major-reduction reward is won.
pub const MAJOR_REDUCTION_THRESHOLD: f64 = 0.10;

/// Classification of a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  /// Consumption did not drop; no reward.
  Warning,
  /// A reduction below the major threshold; catalog reward, round-robin.
  Success,
  /// A reduction of 10% or more; the fixed major-reduction reward.
  SuccessSpecial,
}

/// Classify a reading against the prior one.
///
/// Any strict decrease counts as a reduction. `previous == 0` makes the
/// reduction undefined and deliberately classifies as [`Outcome::Warning`]
/// for every non-negative `current`.
pub fn classify(current: f64, previous: f64) -> Outcome {
  if current >= previous {
    return Outcome::Warning;
  }

  // current < previous and current >= 0, so previous > 0 here.
  let reduction = (previous - current) / previous;
  if reduction >= MAJOR_REDUCTION_THRESHOLD {
    Outcome::SuccessSpecial
  } else {
    Outcome::Success
  }
}

/// The catalog template for an outcome, or `None` for a warning.
///
/// Small wins cycle through [`CATALOG`] at position `rewards_so_far mod N`,
/// guaranteeing variety across repeated successes.
pub fn pick_template(outcome: Outcome, rewards_so_far: usize) -> Option<&'static RewardTemplate> {
  match outcome {
    Outcome::Warning => None,
    Outcome::Success => Some(&CATALOG[rewards_so_far % CATALOG.len()]),
    Outcome::SuccessSpecial => Some(&MAJOR_REDUCTION),
  }
}

/// The evaluator's verdict on one submission.
#[derive(Debug, Clone)]
pub struct Decision {
  pub outcome: Outcome,
  /// Exactly one reward on `Success`/`SuccessSpecial`, none on `Warning`.
  pub reward:  Option<NewReward>,
}

/// Evaluate a submission: classify and, where earned, instantiate the reward.
///
/// The ledger append itself happens regardless of the outcome and is the
/// caller's responsibility.
pub fn evaluate(
  current: f64,
  previous: f64,
  rewards_so_far: usize,
  now: DateTime<Utc>,
) -> Decision {
  let outcome = classify(current, previous);
  let reward = pick_template(outcome, rewards_so_far).map(|t| t.instantiate(now));
  Decision { outcome, reward }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::reward::RewardKind;

  #[test]
  fn no_reduction_is_a_warning() {
    assert_eq!(classify(100.0, 100.0), Outcome::Warning);
    assert_eq!(classify(101.0, 100.0), Outcome::Warning);
    assert_eq!(classify(0.0, 0.0), Outcome::Warning);
  }

  #[test]
  fn zero_previous_is_always_a_warning() {
    assert_eq!(classify(0.0, 0.0), Outcome::Warning);
    assert_eq!(classify(5.0, 0.0), Outcome::Warning);
  }

  #[test]
  fn threshold_boundary_is_inclusive() {
    // Exactly 10% triggers the special branch.
    assert_eq!(classify(90.0, 100.0), Outcome::SuccessSpecial);
    assert_eq!(classify(90.1, 100.0), Outcome::Success);
    assert_eq!(classify(89.9, 100.0), Outcome::SuccessSpecial);
  }

  #[test]
  fn small_reduction_is_a_plain_success() {
    assert_eq!(classify(99.0, 100.0), Outcome::Success);
    assert_eq!(classify(95.0, 100.0), Outcome::Success);
  }

  #[test]
  fn any_reduction_from_tiny_previous_is_special() {
    // A drop to zero is a 100% reduction.
    assert_eq!(classify(0.0, 1.0), Outcome::SuccessSpecial);
  }

  #[test]
  fn round_robin_wraps_over_the_catalog() {
    let n = CATALOG.len();
    for k in 0..(n * 2) {
      let picked = pick_template(Outcome::Success, k).unwrap();
      assert_eq!(picked.title, CATALOG[k % n].title);
    }
    // After N successes the first template recurs.
    assert_eq!(
      pick_template(Outcome::Success, 0).unwrap().title,
      pick_template(Outcome::Success, n).unwrap().title,
    );
  }

  #[test]
  fn warning_yields_no_reward() {
    let decision = evaluate(100.0, 100.0, 3, chrono::Utc::now());
    assert_eq!(decision.outcome, Outcome::Warning);
    assert!(decision.reward.is_none());
  }

  #[test]
  fn special_success_yields_the_fixed_coupon() {
    let decision = evaluate(40.0, 50.0, 7, chrono::Utc::now());
    assert_eq!(decision.outcome, Outcome::SuccessSpecial);
    let reward = decision.reward.unwrap();
    assert_eq!(reward.kind, RewardKind::Coupon);
    assert_eq!(reward.title, MAJOR_REDUCTION.title);
  }

  #[test]
  fn plain_success_instantiates_the_indexed_template() {
    let decision = evaluate(99.0, 100.0, 1, chrono::Utc::now());
    assert_eq!(decision.outcome, Outcome::Success);
    assert_eq!(decision.reward.unwrap().title, CATALOG[1].title);
  }
}
