use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    error::{AppError, Result},
    models::{ApiResponse, ContactAck, ContactRequest},
    services::ContactService,
};

use super::AppState;

/// POST /api/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ContactAck>>> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("Rejected contact body: {}", e);
        AppError::BadRequest("Request body must be a JSON object".to_string())
    })?;

    let service = ContactService::new(state.contact_log.clone());
    service.submit(req)?;

    Ok(Json(ApiResponse::success(ContactAck {
        message: "Message received".to_string(),
    })))
}
