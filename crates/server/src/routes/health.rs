use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub ready: bool,
}

/// Health check endpoint. Always 200 once the listener is up; `ready` flips
/// to true when startup resolution has activated an encoder.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model: state.service.model_name().to_string(),
        ready: state.service.is_ready(),
    })
}
