//! PostgreSQL database operations

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgConnection, PgPool, Postgres, Transaction};

use crate::error::{ApiError, Result};
use crate::models::*;

/// Unique constraint guarding the idempotency ledger
pub const IDEMPOTENCY_KEY_CONSTRAINT: &str = "review_records_idempotency_key_unique";

// SQLSTATE codes worth another attempt
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const UNIQUE_VIOLATION: &str = "23505";

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a pool that only connects when first used
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Open a review transaction whose lock waits give up after `lock_timeout`
    pub async fn begin_review(&self, lock_timeout: Duration) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{}ms", lock_timeout.as_millis()))
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }

    // === User Card State Repository ===

    /// Fetch the pair's state under a row lock, creating an empty row first if needed
    pub async fn lock_user_card_state(
        conn: &mut PgConnection,
        user_id: &str,
        card_id: &str,
    ) -> Result<DbUserCardState> {
        sqlx::query(
            r#"
            INSERT INTO user_card_states (user_id, card_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, card_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(card_id)
        .execute(&mut *conn)
        .await?;

        let state = sqlx::query_as::<_, DbUserCardState>(
            r#"
            SELECT id, user_id, card_id, next_review, last_interval_seconds,
                   last_reviewed_at, created_at
            FROM user_card_states
            WHERE user_id = $1 AND card_id = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(card_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(state)
    }

    /// Write the outcome of a review to the pair's state
    pub async fn update_user_card_state(
        conn: &mut PgConnection,
        state_id: i64,
        next_review: DateTime<Utc>,
        last_interval_seconds: i64,
        last_reviewed_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_card_states
            SET next_review = $2,
                last_interval_seconds = $3,
                last_reviewed_at = $4
            WHERE id = $1
            "#,
        )
        .bind(state_id)
        .bind(next_review)
        .bind(last_interval_seconds)
        .bind(last_reviewed_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Get a pair's state without locking
    pub async fn get_user_card_state(
        &self,
        user_id: &str,
        card_id: &str,
    ) -> Result<Option<DbUserCardState>> {
        let state = sqlx::query_as::<_, DbUserCardState>(
            r#"
            SELECT id, user_id, card_id, next_review, last_interval_seconds,
                   last_reviewed_at, created_at
            FROM user_card_states
            WHERE user_id = $1 AND card_id = $2
            "#,
        )
        .bind(user_id)
        .bind(card_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(state)
    }

    /// Get cards of a user due at or before `until`
    pub async fn get_due_cards(&self, user_id: &str, until: DateTime<Utc>) -> Result<Vec<DueCard>> {
        let cards = sqlx::query_as::<_, DueCard>(
            r#"
            SELECT card_id, next_review, last_interval_seconds
            FROM user_card_states
            WHERE user_id = $1 AND next_review IS NOT NULL AND next_review <= $2
            ORDER BY next_review, card_id
            "#,
        )
        .bind(user_id)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    // === Review Record Repository ===

    /// Get the review recorded under an idempotency key
    pub async fn find_review_by_key(&self, idempotency_key: &str) -> Result<Option<DbReviewRecord>> {
        let record = sqlx::query_as::<_, DbReviewRecord>(
            r#"
            SELECT id, idempotency_key, user_id, card_id, rating, reviewed_at,
                   next_review_at, created_at
            FROM review_records
            WHERE idempotency_key = $1
            "#,
        )
        .bind(idempotency_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Insert a review record
    pub async fn insert_review_record(
        conn: &mut PgConnection,
        record: &NewReviewRecord<'_>,
    ) -> Result<DbReviewRecord> {
        let record = sqlx::query_as::<_, DbReviewRecord>(
            r#"
            INSERT INTO review_records (idempotency_key, user_id, card_id, rating,
                                        reviewed_at, next_review_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, idempotency_key, user_id, card_id, rating, reviewed_at,
                      next_review_at, created_at
            "#,
        )
        .bind(record.idempotency_key)
        .bind(record.user_id)
        .bind(record.card_id)
        .bind(record.rating.to_value())
        .bind(record.reviewed_at)
        .bind(record.next_review_at)
        .fetch_one(conn)
        .await?;

        Ok(record)
    }

    /// Get all reviews of a pair, oldest first
    pub async fn get_reviews_for_pair(
        &self,
        user_id: &str,
        card_id: &str,
    ) -> Result<Vec<DbReviewRecord>> {
        let records = sqlx::query_as::<_, DbReviewRecord>(
            r#"
            SELECT id, idempotency_key, user_id, card_id, rating, reviewed_at,
                   next_review_at, created_at
            FROM review_records
            WHERE user_id = $1 AND card_id = $2
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .bind(card_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

/// Whether a store error is a lock timeout, conflict or exhausted pool
pub fn is_transient(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_error) => matches!(
            db_error.code().as_deref(),
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED | LOCK_NOT_AVAILABLE)
        ),
        _ => false,
    }
}

/// Whether a store error is a unique violation on the idempotency key
pub fn is_idempotency_conflict(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => {
            db_error.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_error
                    .constraint()
                    .map_or(true, |name| name == IDEMPOTENCY_KEY_CONSTRAINT)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_transient() {
        assert!(is_transient(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn test_other_errors_are_not_transient() {
        assert!(!is_transient(&sqlx::Error::RowNotFound));
        assert!(!is_transient(&sqlx::Error::PoolClosed));
        assert!(!is_idempotency_conflict(&sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn test_connect_lazy_does_not_touch_network() {
        let db = Database::connect_lazy("postgres://reviews@localhost:1/reviews").unwrap();
        assert_eq!(db.pool().size(), 0);
    }
}
