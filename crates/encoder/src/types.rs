use serde::Serialize;
use std::fmt;

/// Output dimension shared by all tiers. The fallback must match the neural
/// tiers' shape so the encoders stay drop-in interchangeable.
pub const EMBEDDING_DIM: usize = 768;

/// A single text's embedding vector.
pub type Embedding = Vec<f32>;

/// Which construction strategy produced the active encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderTier {
    /// Hosted inference endpoint.
    Managed,
    /// Local tokenizer + ONNX session.
    Onnx,
    /// Deterministic character-hash embedder.
    Fallback,
}

impl EncoderTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncoderTier::Managed => "managed",
            EncoderTier::Onnx => "onnx",
            EncoderTier::Fallback => "fallback",
        }
    }
}

impl fmt::Display for EncoderTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_display_matches_as_str() {
        for tier in [EncoderTier::Managed, EncoderTier::Onnx, EncoderTier::Fallback] {
            assert_eq!(tier.to_string(), tier.as_str());
        }
    }

    #[test]
    fn tier_serializes_lowercase() {
        let json = serde_json::to_string(&EncoderTier::Fallback).unwrap();
        assert_eq!(json, "\"fallback\"");
    }
}
