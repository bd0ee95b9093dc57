//! Review endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// POST /api/reviews
///
/// Responds 201 when the review was recorded and 200 when it replays an earlier
/// submission with the same idempotency key.
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SubmitReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReviewResponse>)> {
    let Json(payload) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let review = payload.validate(Utc::now())?;

    let outcome = state.reviews.submit_review(review).await?;

    let status = match outcome.status {
        ReviewStatus::Created => StatusCode::CREATED,
        ReviewStatus::Duplicate => StatusCode::OK,
    };

    Ok((status, Json(outcome.review)))
}
