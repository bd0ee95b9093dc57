//! Interval rule for the next review of a pair.
//!
//! A failed recall always comes back after a short retry delay. The first successful
//! review jumps to a fixed interval, and later successful reviews grow the previous
//! interval by a per-rating multiplier.

use crate::types::Rating;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Interval parameters with the production defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalPolicy {
    pub retry_interval_seconds: i64,
    pub initial_easy_seconds: i64,
    pub initial_hard_seconds: i64,
    pub easy_multiplier: f64,
    pub hard_multiplier: f64,
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        Self {
            retry_interval_seconds: 60,
            initial_easy_seconds: 30 * SECONDS_PER_DAY,
            initial_hard_seconds: 3 * SECONDS_PER_DAY,
            easy_multiplier: 4.0,
            hard_multiplier: 2.0,
        }
    }
}

impl IntervalPolicy {
    /// Candidate interval in seconds, before any monotonicity floor.
    pub fn candidate_interval(&self, previous: Option<i64>, rating: Rating, is_first: bool) -> i64 {
        let interval = match (rating, is_first) {
            (Rating::Retry, _) => self.retry_interval_seconds,
            (Rating::Easy, true) => self.initial_easy_seconds,
            (Rating::Hard, true) => self.initial_hard_seconds,
            (Rating::Easy, false) => grow(
                previous.unwrap_or(self.initial_easy_seconds),
                self.easy_multiplier,
            ),
            (Rating::Hard, false) => grow(
                previous.unwrap_or(self.initial_hard_seconds),
                self.hard_multiplier,
            ),
        };
        interval.max(0)
    }
}

// Truncates toward zero; `as` saturates on overflow.
fn grow(base: i64, multiplier: f64) -> i64 {
    (base as f64 * multiplier) as i64
}
