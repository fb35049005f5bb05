use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    constants::SNR_TOKEN_SYMBOL,
    error::{AppError, Result},
    models::ApiResponse,
    wallet::{units::is_valid_evm_address, WalletSession},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub native: String,
    pub token: String,
    pub token_symbol: String,
}

/// POST /api/v1/wallet/balances
///
/// Reads the native and SNR balances of `address` through the configured
/// provider. A failing SNR read is reported as `"0"`.
pub async fn get_balances(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BalanceRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BalanceResponse>>> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("Rejected balance request body: {}", e);
        AppError::BadRequest("Request body must be {\"address\": \"0x...\"}".to_string())
    })?;
    let address = req.address.trim();
    if !is_valid_evm_address(address) {
        return Err(AppError::BadRequest(
            "Invalid EVM wallet address format (expected 0x + 40 hex chars)".to_string(),
        ));
    }

    let balances = state.wallet.fetch_balances(address).await?;

    Ok(Json(ApiResponse::success(BalanceResponse {
        address: address.to_string(),
        native: balances.native,
        token: balances.token,
        token_symbol: SNR_TOKEN_SYMBOL.to_string(),
    })))
}

/// GET /api/v1/wallet/session
///
/// Session held by the background wallet watcher, if one is running.
pub async fn get_session(State(state): State<AppState>) -> Json<ApiResponse<WalletSession>> {
    Json(ApiResponse::success(state.wallet.session().await))
}
