use axum::{extract::State, Json};
use serde::Serialize;
use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub wallet_provider: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let wallet_provider = if state.wallet.has_provider() {
        "configured".to_string()
    } else {
        "unavailable".to_string()
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        wallet_provider,
    })
}
