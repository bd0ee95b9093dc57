//! Core review-scheduling library used by the backend.
//!
//! Provides:
//! - The interval rule for the next review of a (user, card) pair
//! - Monotonic planning of a pair's next due date
//! - Timestamp parsing and validation errors for submissions
//! - Shared types (Rating, ReviewStatus, PairSchedule)

pub mod algorithm;
pub mod error;
pub mod timestamp;
pub mod types;

pub use algorithm::{plan_review, IntervalPolicy, SchedulingResult, SECONDS_PER_DAY};
pub use error::{Result, ValidationError};
pub use timestamp::parse_timestamp;
pub use types::{PairSchedule, Rating, ReviewStatus};
