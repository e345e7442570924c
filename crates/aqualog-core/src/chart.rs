//! Chart-scale derivation for the consumption history display.
//!
//! Pure and order-preserving; recomputed from scratch on every read. Not a
//! caching layer.

use serde::Serialize;

use crate::ledger::Reading;

/// Figures a renderer needs to scale a bar chart of the full history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartStats {
  /// Arithmetic mean of all consumption values.
  pub average:   f64,
  /// Vertical scale: `max(max(values), average * 1.2)`, keeping the average
  /// reference line visibly below the tallest bar.
  pub scale_max: f64,
  /// Index of the first maximum value.
  pub highest:   usize,
}

impl ChartStats {
  /// Derive chart figures from the history, or `None` if it is empty.
  pub fn derive(history: &[Reading]) -> Option<Self> {
    if history.is_empty() {
      return None;
    }

    let total: f64 = history.iter().map(|r| r.consumption).sum();
    let average = total / history.len() as f64;

    let peak = history
      .iter()
      .map(|r| r.consumption)
      .fold(f64::NEG_INFINITY, f64::max);
    let highest = history
      .iter()
      .position(|r| r.consumption == peak)
      .unwrap_or(0);

    Some(Self {
      average,
      scale_max: peak.max(average * 1.2),
      highest,
    })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
