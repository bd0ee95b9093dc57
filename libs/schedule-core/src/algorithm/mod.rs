//! Spaced repetition interval scheduling.

pub mod interval;
pub mod monotonic;

pub use interval::{IntervalPolicy, SECONDS_PER_DAY};
pub use monotonic::{plan_review, SchedulingResult};
