//! Interval scheduling used by the review processor.
//!
//! Re-exports from schedule-core.

pub use schedule_core::algorithm::plan_review;
