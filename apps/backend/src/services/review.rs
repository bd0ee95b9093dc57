//! Review submission processing.
//!
//! Each attempt at a submission runs three stages:
//! - replay of an already recorded idempotency key, without taking any lock
//! - a single transaction that locks the pair's state row, plans the new due date,
//!   inserts the immutable review record and updates the state
//! - on a unique violation of the idempotency key, replay of the winning record
//!
//! Lock timeouts, deadlocks, serialization failures and pool timeouts in any stage abort
//! the attempt as a whole and are retried a bounded number of times.

use std::sync::Arc;

use crate::config::ReviewSettings;
use crate::db::{is_idempotency_conflict, is_transient, Database};
use crate::error::{ApiError, Result};
use crate::models::{NewReviewRecord, ReviewOutcome, ReviewResponse, ReviewStatus, ValidatedReview};
use crate::services::algorithm::plan_review;

/// Applies validated review submissions to the store
#[derive(Clone)]
pub struct ReviewProcessor {
    db: Arc<Database>,
    settings: ReviewSettings,
}

impl ReviewProcessor {
    pub fn new(db: Arc<Database>, settings: ReviewSettings) -> Self {
        Self { db, settings }
    }

    /// Record a review and return the pair's next due date.
    pub async fn submit_review(&self, review: ValidatedReview) -> Result<ReviewOutcome> {
        let mut attempt = 1;
        loop {
            let reason = match self.attempt(&review).await {
                Ok(Some(outcome)) => return Ok(outcome),
                Ok(None) => "idempotency key held by an uncommitted submission".to_string(),
                Err(ApiError::Database(error)) if is_transient(&error) => error.to_string(),
                Err(other) => return Err(other),
            };

            if attempt >= self.settings.max_attempts {
                tracing::warn!(
                    user_id = %review.user_id,
                    card_id = %review.card_id,
                    attempts = attempt,
                    %reason,
                    "giving up on review"
                );
                return Err(ApiError::Unavailable(format!(
                    "review of card {} could not be recorded after {} attempts",
                    review.card_id, attempt
                )));
            }

            tracing::warn!(
                user_id = %review.user_id,
                card_id = %review.card_id,
                attempt,
                %reason,
                "transient store fault, retrying review"
            );
            tokio::time::sleep(self.settings.retry_backoff * attempt).await;
            attempt += 1;
        }
    }

    /// Replay, then the locked write, then replay of a concurrent winner.
    ///
    /// `Ok(None)` means the key is taken by a submission that has not committed yet.
    async fn attempt(&self, review: &ValidatedReview) -> Result<Option<ReviewOutcome>> {
        if let Some(outcome) = self.replay(review).await? {
            tracing::debug!(
                idempotency_key = review.idempotency_key.as_deref(),
                "replaying recorded review"
            );
            return Ok(Some(outcome));
        }

        match self.apply(review).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(ApiError::Database(error)) if is_idempotency_conflict(&error) => {
                let outcome = self.replay(review).await?;
                if outcome.is_some() {
                    tracing::info!(
                        idempotency_key = review.idempotency_key.as_deref(),
                        "concurrent submission won the idempotency key"
                    );
                }
                Ok(outcome)
            }
            Err(error) => Err(error),
        }
    }

    /// Existing record for the submission's idempotency key, if any
    async fn replay(&self, review: &ValidatedReview) -> Result<Option<ReviewOutcome>> {
        let Some(key) = review.idempotency_key.as_deref() else {
            return Ok(None);
        };

        let existing = self.db.find_review_by_key(key).await?;
        Ok(existing.as_ref().map(ReviewOutcome::duplicate))
    }

    /// One attempt of the locked read-modify-write
    async fn apply(&self, review: &ValidatedReview) -> Result<ReviewOutcome> {
        let mut tx = self.db.begin_review(self.settings.lock_timeout).await?;

        let state = Database::lock_user_card_state(&mut tx, &review.user_id, &review.card_id).await?;
        let plan = plan_review(
            &self.settings.policy,
            &state.schedule(),
            review.rating,
            review.reviewed_at,
        );

        if plan.kept_stored_due {
            tracing::debug!(
                user_id = %review.user_id,
                card_id = %review.card_id,
                next_review = %plan.next_review_at,
                "keeping later due date already stored for pair"
            );
        }

        Database::insert_review_record(
            &mut tx,
            &NewReviewRecord {
                idempotency_key: review.idempotency_key.as_deref(),
                user_id: &review.user_id,
                card_id: &review.card_id,
                rating: review.rating,
                reviewed_at: review.reviewed_at,
                next_review_at: plan.next_review_at,
            },
        )
        .await?;

        Database::update_user_card_state(
            &mut tx,
            state.id,
            plan.next_review_at,
            plan.interval_seconds,
            review.reviewed_at,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %review.user_id,
            card_id = %review.card_id,
            rating = review.rating.to_value(),
            interval_seconds = plan.interval_seconds,
            "review recorded"
        );

        Ok(ReviewOutcome {
            review: ReviewResponse {
                user_id: review.user_id.clone(),
                card_id: review.card_id.clone(),
                next_review_at: plan.next_review_at,
                last_interval_seconds: Some(plan.interval_seconds),
            },
            status: ReviewStatus::Created,
        })
    }
}
