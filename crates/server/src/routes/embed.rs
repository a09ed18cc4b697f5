use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Batch embedding request.
#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    pub texts: Vec<String>,
    /// Optional response label. Does not change which encoder runs.
    #[serde(default)]
    pub model: Option<String>,
}

/// Word-count based usage accounting. The fallback tier has no tokenizer, so
/// whitespace-delimited words stand in for tokens in every tier; there is no
/// completion concept, so both fields carry the same count.
#[derive(Debug, Serialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub total_tokens: usize,
}

/// Batch embedding response: one vector per input text, in input order.
#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
    pub model: String,
    pub usage: Usage,
}

/// Generate embeddings for a batch of texts.
///
/// Validation and encoding run on a blocking task: `encode` is CPU-bound and
/// may hold an inference session lock, neither of which belongs on a runtime
/// worker thread.
pub async fn embed_texts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmbedRequest>,
) -> ApiResult<Json<EmbedResponse>> {
    let service = state.service.clone();
    let output = tokio::task::spawn_blocking(move || {
        service.embed(&request.texts, request.model.as_deref())
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(EmbedResponse {
        embeddings: output.embeddings,
        model: output.model,
        usage: Usage {
            prompt_tokens: output.words,
            total_tokens: output.words,
        },
    }))
}
