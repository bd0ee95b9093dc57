//! Test fixtures and factory functions for creating test data.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

use spaced_review_backend::models::{Rating, ValidatedReview};

/// Generate a unique id so runs against a shared database do not collide.
pub fn unique_id(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

/// Fixed review time used by deterministic tests.
pub fn reviewed_at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
}

/// Format a timestamp the way clients send it.
pub fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Create a review request body.
pub fn review_request(user_id: &str, card_id: &str, rating: i64) -> serde_json::Value {
    json!({
        "user_id": user_id,
        "card_id": card_id,
        "rating": rating
    })
}

/// Create a review request body with an explicit review time.
pub fn review_request_at(
    user_id: &str,
    card_id: &str,
    rating: i64,
    at: DateTime<Utc>,
) -> serde_json::Value {
    json!({
        "user_id": user_id,
        "card_id": card_id,
        "rating": rating,
        "reviewed_at": iso(at)
    })
}

/// Create a review request body carrying an idempotency key.
pub fn keyed_review_request(
    key: &str,
    user_id: &str,
    card_id: &str,
    rating: i64,
) -> serde_json::Value {
    json!({
        "idempotency_key": key,
        "user_id": user_id,
        "card_id": card_id,
        "rating": rating
    })
}

/// Create a validated submission for driving the processor directly.
pub fn validated_review(
    key: Option<&str>,
    user_id: &str,
    card_id: &str,
    rating: Rating,
    at: DateTime<Utc>,
) -> ValidatedReview {
    ValidatedReview {
        idempotency_key: key.map(str::to_string),
        user_id: user_id.to_string(),
        card_id: card_id.to_string(),
        rating,
        reviewed_at: at,
    }
}
