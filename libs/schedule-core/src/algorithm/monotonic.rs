//! Monotonic transition of a pair's schedule.

use chrono::{DateTime, Duration, Utc};

use super::interval::IntervalPolicy;
use crate::types::{PairSchedule, Rating};

/// Planned outcome of one review against the pair's current schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingResult {
    pub interval_seconds: i64,
    pub next_review_at: DateTime<Utc>,
    /// Set when a later stored due date won over the computed one.
    pub kept_stored_due: bool,
}

/// Compute the next due date for `rating` given the pair's current schedule.
///
/// The interval never shrinks below the previous one, and a stored due date later than
/// the computed one is kept, with the interval recomputed from it so the pair stays
/// consistent. Callers must hold the pair's lock while the plan is applied.
pub fn plan_review(
    policy: &IntervalPolicy,
    state: &PairSchedule,
    rating: Rating,
    reviewed_at: DateTime<Utc>,
) -> SchedulingResult {
    let previous = state.last_interval_seconds;
    let candidate = policy.candidate_interval(previous, rating, state.is_first_review());

    let interval_seconds = match previous {
        Some(previous) => candidate.max(previous),
        None => candidate,
    };
    let next_review_at = add_seconds(reviewed_at, interval_seconds);

    match state.next_review {
        Some(stored) if stored > next_review_at => SchedulingResult {
            interval_seconds: (stored - reviewed_at).num_seconds(),
            next_review_at: stored,
            kept_stored_due: true,
        },
        _ => SchedulingResult {
            interval_seconds,
            next_review_at,
            kept_stored_due: false,
        },
    }
}

fn add_seconds(at: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    Duration::try_seconds(seconds)
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
