//! Database models and API types

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub use schedule_core::{PairSchedule, Rating, ReviewStatus, ValidationError};

pub const MAX_ID_LENGTH: usize = 128;
pub const MAX_IDEMPOTENCY_KEY_LENGTH: usize = 256;

// === Database Entity Types ===

/// Scheduling state of one (user, card) pair
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUserCardState {
    pub id: i64,
    pub user_id: String,
    pub card_id: String,
    pub next_review: Option<DateTime<Utc>>,
    pub last_interval_seconds: Option<i64>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DbUserCardState {
    /// Scheduling fields consumed by the interval planner
    pub fn schedule(&self) -> PairSchedule {
        PairSchedule {
            next_review: self.next_review,
            last_interval_seconds: self.last_interval_seconds,
            last_reviewed_at: self.last_reviewed_at,
        }
    }
}

/// Immutable review record, doubling as the idempotency ledger
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReviewRecord {
    pub id: i64,
    pub idempotency_key: Option<String>,
    pub user_id: String,
    pub card_id: String,
    pub rating: i16,
    pub reviewed_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl DbReviewRecord {
    /// Interval the record applied, derived from its own timestamps
    pub fn interval_seconds(&self) -> i64 {
        (self.next_review_at - self.reviewed_at).num_seconds()
    }

    /// Response replaying this record
    pub fn to_response(&self) -> ReviewResponse {
        ReviewResponse {
            user_id: self.user_id.clone(),
            card_id: self.card_id.clone(),
            next_review_at: self.next_review_at,
            last_interval_seconds: Some(self.interval_seconds()),
        }
    }
}

/// Review record about to be inserted
#[derive(Debug, Clone)]
pub struct NewReviewRecord<'a> {
    pub idempotency_key: Option<&'a str>,
    pub user_id: &'a str,
    pub card_id: &'a str,
    pub rating: Rating,
    pub reviewed_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
}

/// Card due for review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DueCard {
    pub card_id: String,
    pub next_review: DateTime<Utc>,
    pub last_interval_seconds: Option<i64>,
}

// === API Request/Response Types ===

/// Body of POST /api/reviews
///
/// Fields are optional so that missing values surface as validation errors with a
/// readable detail instead of a decoder rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub idempotency_key: Option<String>,
    pub user_id: Option<String>,
    pub card_id: Option<String>,
    pub rating: Option<i64>,
    pub reviewed_at: Option<String>,
}

/// Submission that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReview {
    pub idempotency_key: Option<String>,
    pub user_id: String,
    pub card_id: String,
    pub rating: Rating,
    pub reviewed_at: DateTime<Utc>,
}

impl SubmitReviewRequest {
    /// Check the submission, defaulting `reviewed_at` to `now`.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedReview, ValidationError> {
        let user_id = required_id("user_id", self.user_id)?;
        let card_id = required_id("card_id", self.card_id)?;

        let rating = self
            .rating
            .ok_or(ValidationError::MissingField { field: "rating" })
            .and_then(Rating::try_from)?;

        let idempotency_key = self
            .idempotency_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        if let Some(key) = &idempotency_key {
            check_length("idempotency_key", key, MAX_IDEMPOTENCY_KEY_LENGTH)?;
        }

        let reviewed_at = match self.reviewed_at.as_deref() {
            Some(raw) => schedule_core::parse_timestamp("reviewed_at", raw)?,
            None => now.trunc_subsecs(6),
        };

        Ok(ValidatedReview {
            idempotency_key,
            user_id,
            card_id,
            rating,
            reviewed_at,
        })
    }
}

fn required_id(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField { field })?;
    check_length(field, &value, MAX_ID_LENGTH)?;
    Ok(value)
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Body of a review response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub user_id: String,
    pub card_id: String,
    pub next_review_at: DateTime<Utc>,
    pub last_interval_seconds: Option<i64>,
}

/// Result of a submission together with how it was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub review: ReviewResponse,
    pub status: ReviewStatus,
}

impl ReviewOutcome {
    pub fn duplicate(record: &DbReviewRecord) -> Self {
        Self {
            review: record.to_response(),
            status: ReviewStatus::Duplicate,
        }
    }
}

/// Query string of GET /api/users/:user_id/due-cards
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DueCardsQuery {
    pub until: Option<String>,
}

impl DueCardsQuery {
    /// Parsed `until` cutoff
    pub fn until(&self) -> Result<DateTime<Utc>, ValidationError> {
        match self.until.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => schedule_core::parse_timestamp("until", raw),
            _ => Err(ValidationError::MissingTimestamp { field: "until" }),
        }
    }
}
