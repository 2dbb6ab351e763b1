//! # Question Handlers
//!
//! `POST /api/ask` always answers 200 once the question passes validation: workflow
//! failures travel inside the body with an `error_category`.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::orchestration::{AnalystStats, AskResponse};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/ask
pub async fn ask_question(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> ApiResult<Json<AskResponse>> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::bad_request("question must not be empty"));
    }

    debug!(question = %question, "Question received over HTTP");
    Ok(Json(state.orchestrator().ask(question).await))
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<AnalystStats> {
    Json(state.orchestrator().get_stats())
}

/// GET or POST /api/reset
pub async fn reset_session(State(state): State<AppState>) -> Json<MessageResponse> {
    state.orchestrator().reset();
    Json(MessageResponse {
        message: "Session reset successfully".to_string(),
    })
}
