//! Core types for review scheduling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Reviewer-supplied recall quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    /// Failed recall, retry shortly.
    Retry,
    Hard,
    Easy,
}

impl Rating {
    /// Convert to the numeric value stored with review records (0-2).
    pub fn to_value(self) -> i16 {
        match self {
            Self::Retry => 0,
            Self::Hard => 1,
            Self::Easy => 2,
        }
    }

    /// Create from numeric value.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Retry),
            1 => Some(Self::Hard),
            2 => Some(Self::Easy),
            _ => None,
        }
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or(ValidationError::InvalidRating(value))
    }
}

/// Whether a submission produced a new review record or replayed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStatus {
    Created,
    Duplicate,
}

/// Scheduling fields of a (user, card) pair as last persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSchedule {
    pub next_review: Option<DateTime<Utc>>,
    pub last_interval_seconds: Option<i64>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl PairSchedule {
    /// True when the pair has never been reviewed.
    pub fn is_first_review(&self) -> bool {
        self.last_interval_seconds.is_none() && self.last_reviewed_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rating_round_trips_through_value() {
        for value in 0..=2 {
            let rating = Rating::from_value(value).unwrap();
            assert_eq!(i64::from(rating.to_value()), value);
        }
    }

    #[test]
    fn rating_rejects_out_of_range() {
        assert_eq!(Rating::from_value(3), None);
        assert_eq!(Rating::from_value(-1), None);
        assert_eq!(
            Rating::try_from(7).unwrap_err(),
            ValidationError::InvalidRating(7)
        );
    }

    #[test]
    fn empty_pair_is_first_review() {
        assert!(PairSchedule::default().is_first_review());
    }

    #[test]
    fn reviewed_pair_is_not_first_review() {
        let reviewed = PairSchedule {
            last_reviewed_at: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(!reviewed.is_first_review());

        let with_interval = PairSchedule {
            last_interval_seconds: Some(60),
            ..Default::default()
        };
        assert!(!with_interval.is_first_review());
    }
}
