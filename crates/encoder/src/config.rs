use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default model identifier, fixed at deploy time. Requests may relabel the
/// response but never redirect which encoder runs.
pub const DEFAULT_MODEL: &str = "nomic-ai/nomic-embed-text-v2-moe";

/// Token budget for the ONNX tier: sequences are truncated here before the
/// forward pass.
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 512;

/// Runtime configuration consumed by the resolver and the individual tiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncoderConfig {
    /// Model identifier the neural tiers bind to.
    pub model_name: String,
    /// Truncation limit for the ONNX tier, in tokens.
    pub max_sequence_length: usize,
    /// Where downloaded weights land. `None` uses the hub's default cache.
    pub cache_dir: Option<PathBuf>,
    /// Managed-tier inference endpoint. `None` derives the default endpoint
    /// from [`model_name`](Self::model_name).
    pub api_url: Option<String>,
    /// Bearer token for the managed endpoint.
    pub api_token: Option<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL.to_string(),
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
            cache_dir: None,
            api_url: None,
            api_token: None,
        }
    }
}

impl EncoderConfig {
    /// Builds a config for `model_name`, picking up the endpoint and token
    /// overrides from `EMBED_API_URL` / `HF_TOKEN` when set.
    pub fn for_model(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            api_url: std::env::var("EMBED_API_URL").ok(),
            api_token: std::env::var("HF_TOKEN").ok(),
            ..Self::default()
        }
    }
}
