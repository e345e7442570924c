//! The consumption ledger — an append-only, per-profile sequence of monthly
//! meter readings, plus the statistics derived from it on read.
//!
//! Readings are never updated or deleted after creation. Ordering is append
//! order; the ledger is never re-sorted.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Readings ────────────────────────────────────────────────────────────────

/// A single monthly consumption value, in cubic meters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
  pub reading_id:  Uuid,
  pub profile_id:  Uuid,
  pub consumption: f64,
  pub recorded_at: DateTime<Utc>,
}

/// Input to [`crate::store::LedgerStore::append_readings`].
/// `reading_id` is always set by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
  pub consumption: f64,
  pub recorded_at: DateTime<Utc>,
}

impl NewReading {
  /// Build a reading, rejecting non-finite or negative consumption.
  pub fn new(consumption: f64, recorded_at: DateTime<Utc>) -> Result<Self> {
    if !consumption.is_finite() || consumption < 0.0 {
      return Err(Error::InvalidConsumption(consumption));
    }
    Ok(Self { consumption, recorded_at })
  }
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// One user-initiated submission of meter readings.
///
/// A brand-new profile (empty history) must supply both a previous and a
/// current value; the previous reading is back-dated one calendar month.
/// Once history exists only `current` is used and any supplied `previous`
/// is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
  pub current:  f64,
  pub previous: Option<f64>,
}

impl Submission {
  /// Expand the submission into the readings to append, validating every
  /// value before anything is written.
  pub fn plan(&self, history_is_empty: bool, now: DateTime<Utc>) -> Result<Vec<NewReading>> {
    let current = NewReading::new(self.current, now)?;

    if !history_is_empty {
      return Ok(vec![current]);
    }

    let previous = self.previous.ok_or(Error::MissingBaseline)?;
    // Same day-of-month one month back, clamped to the last valid day.
    let a_month_ago = now.checked_sub_months(Months::new(1)).unwrap_or(now);
    let baseline = NewReading::new(previous, a_month_ago)?;

    Ok(vec![baseline, current])
  }
}

// ─── Derived statistics ──────────────────────────────────────────────────────

/// Month-over-month usage figures, recomputed from the ledger on every read.
/// Only the last two readings are ever inspected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageStats {
  /// Final reading's consumption, or 0 for an empty ledger.
  pub last:          f64,
  /// Second-to-last reading's consumption, or 0.
  pub previous:      f64,
  /// `previous - last`; positive means savings.
  pub delta:         f64,
  /// `delta / previous * 100` when `previous > 0`, else 0.
  pub delta_percent: f64,
}

impl UsageStats {
  pub fn derive(history: &[Reading]) -> Self {
    let last = history.last().map_or(0.0, |r| r.consumption);
    let previous = history
      .len()
      .checked_sub(2)
      .and_then(|i| history.get(i))
      .map_or(0.0, |r| r.consumption);

    let delta = previous - last;
    let delta_percent = if previous > 0.0 {
      delta / previous * 100.0
    } else {
      0.0
    };

    Self { last, previous, delta, delta_percent }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
