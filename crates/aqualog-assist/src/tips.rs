//! Tip-of-the-day selection with a process-wide per-calendar-day cache.
//!
//! One generation call per day at most; rotation through the day's list is
//! keyed by day-of-month so every profile sees the same tip on a given day.

use chrono::{DateTime, Datelike as _, NaiveDate, Utc};
use tokio::sync::Mutex;

use crate::Advisor;

/// Tips served when generation is unavailable.
pub const FALLBACK_TIPS: [&str; 5] = [
  "Turn off the tap while brushing your teeth.",
  "Install water-saving showerheads and faucet aerators.",
  "Only run the washing machine and dishwasher with full loads.",
  "Use a bucket to wash your car instead of a hose.",
  "Check for and repair any leaks in your pipes and toilets.",
];

/// Rotation position for a day-of-month over a list of `len` tips.
pub fn rotation_index(day_of_month: u32, len: usize) -> usize {
  (day_of_month.saturating_sub(1) as usize) % len.max(1)
}

/// Caches the day's generated tip list to avoid redundant external calls.
pub struct TipCache {
  inner: Mutex<Option<(NaiveDate, Vec<String>)>>,
}

impl Default for TipCache {
  fn default() -> Self { Self::new() }
}

impl TipCache {
  pub fn new() -> Self {
    Self { inner: Mutex::new(None) }
  }

  /// The tip list for `today`, generating and caching it if the cached list
  /// is stale or missing. Generation failure falls back to
  /// [`FALLBACK_TIPS`] without caching, so the next call retries.
  pub async fn tips_for<A: Advisor>(&self, advisor: &A, today: NaiveDate) -> Vec<String> {
    let mut cached = self.inner.lock().await;

    if let Some((date, tips)) = cached.as_ref()
      && *date == today
      && !tips.is_empty()
    {
      return tips.clone();
    }

    match advisor.generate_tips().await {
      Ok(tips) if !tips.is_empty() => {
        *cached = Some((today, tips.clone()));
        tips
      }
      Ok(_) | Err(_) => FALLBACK_TIPS.iter().map(|&t| t.to_owned()).collect(),
    }
  }
}

/// Today's tip: the day's list rotated by day-of-month.
pub async fn daily_tip<A: Advisor>(
  advisor: &A,
  cache: &TipCache,
  now: DateTime<Utc>,
) -> Option<String> {
  let tips = cache.tips_for(advisor, now.date_naive()).await;
  if tips.is_empty() {
    return None;
  }
  tips.get(rotation_index(now.day(), tips.len())).cloned()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
