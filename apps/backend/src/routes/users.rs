//! Per-user endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/users/:user_id/due-cards?until=ISO8601
pub async fn due_cards(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<DueCardsQuery>,
) -> Result<Json<Vec<DueCard>>> {
    let until = query.until()?;

    let cards = state.db.get_due_cards(&user_id, until).await?;

    Ok(Json(cards))
}
