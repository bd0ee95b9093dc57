//! Error types for schedule-core.

use thiserror::Error;

/// Result type alias using ValidationError.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Faults detected in a review submission or query before any store access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rating must be one of 0, 1 or 2, got {0}")]
    InvalidRating(i64),

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid datetime for '{field}': {value}. Expected ISO8601, e.g. 2025-10-30T00:00:00Z")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("Missing '{field}' query parameter (ISO8601). Example: ?{field}=2025-10-30T00:00:00Z")]
    MissingTimestamp { field: &'static str },
}
