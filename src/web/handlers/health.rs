//! # Health Check Handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::bootstrap::SystemStatus;
use crate::web::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    system: SystemStatus,
}

/// Basic health check endpoint: GET /health
pub async fn basic_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        system: state.system().status(),
    })
}
