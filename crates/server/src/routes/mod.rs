//! API route handlers
//!
//! - `health`: liveness and encoder readiness
//! - `embed`: batch embedding generation

pub mod embed;
pub mod health;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Root endpoint: service banner plus the configured model identifier.
pub async fn api_info(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(json!({
        "message": "Nomic Embedding Server",
        "model": state.service.model_name(),
    })))
}

/// 404 handler for undefined routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
