use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, Result},
    models::{ApiResponse, JoinEligibilityRequest, JoinQuote, RoomTier},
    services::game_rooms::{check_join, find_room, fixture_rooms},
};

use super::AppState;

/// GET /api/v1/rooms
pub async fn list_rooms(State(_state): State<AppState>) -> Json<ApiResponse<Vec<RoomTier>>> {
    Json(ApiResponse::success(fixture_rooms()))
}

/// POST /api/v1/rooms/{room_id}/eligibility
///
/// Fixture-only check; no entry fee is taken.
pub async fn check_eligibility(
    State(_state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<JoinEligibilityRequest>,
) -> Result<Json<ApiResponse<JoinQuote>>> {
    let room = find_room(&room_id)
        .ok_or_else(|| AppError::NotFound(format!("Room {} not found", room_id)))?;

    let quote = check_join(&room, req.snr_balance.as_deref())?;
    tracing::debug!("Join check passed for room {}", quote.room_id);

    Ok(Json(ApiResponse::success(quote)))
}
