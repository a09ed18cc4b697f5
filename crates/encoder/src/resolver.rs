use std::sync::Arc;

use crate::managed::ManagedEncoder;
use crate::onnx::OnnxEncoder;
use crate::types::EncoderTier;
use crate::{Encoder, EncoderConfig, FallbackEncoder};

/// The one encoder a process runs with, plus the metadata the transport layer
/// reports.
#[derive(Clone)]
pub struct ResolvedEncoder {
    pub encoder: Arc<dyn Encoder>,
    pub tier: EncoderTier,
    /// The configured model identifier; responses are labeled with it unless
    /// the request supplies its own label.
    pub model_name: String,
}

/// Produces exactly one operational encoder. Tiers are tried in priority
/// order and each attempt is isolated: a construction failure is logged and
/// the next tier is probed. The fallback tier has no external dependency, so
/// resolution itself never fails.
pub fn resolve(cfg: &EncoderConfig) -> ResolvedEncoder {
    let (encoder, tier): (Arc<dyn Encoder>, EncoderTier) = match ManagedEncoder::connect(cfg) {
        Ok(managed) => (Arc::new(managed), EncoderTier::Managed),
        Err(err) => {
            tracing::warn!(model = %cfg.model_name, error = %err, "managed encoder unavailable, trying onnx");
            match OnnxEncoder::load(cfg) {
                Ok(onnx) => (Arc::new(onnx), EncoderTier::Onnx),
                Err(err) => {
                    tracing::warn!(model = %cfg.model_name, error = %err, "onnx encoder unavailable, using fallback");
                    (Arc::new(FallbackEncoder::new()), EncoderTier::Fallback)
                }
            }
        }
    };

    let resolved = ResolvedEncoder {
        encoder,
        tier,
        model_name: cfg.model_name.clone(),
    };
    tracing::info!(tier = %resolved.tier, model = %resolved.model_name, "encoder resolved");
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_encoder_is_shareable() {
        // The transport layer clones the resolved encoder across request
        // handlers; the Arc keeps that cheap.
        let resolved = ResolvedEncoder {
            encoder: Arc::new(FallbackEncoder::new()),
            tier: EncoderTier::Fallback,
            model_name: "test-model".into(),
        };
        let clone = resolved.clone();
        assert_eq!(clone.tier, EncoderTier::Fallback);
        assert_eq!(clone.model_name, "test-model");
        assert_eq!(Arc::strong_count(&resolved.encoder), 2);
    }

    #[test]
    #[ignore = "requires network access; exercises the full degradation chain"]
    fn resolve_degrades_to_fallback_for_unknown_model() -> anyhow::Result<()> {
        let cfg = EncoderConfig {
            model_name: "definitely/not-a-real-model".into(),
            ..EncoderConfig::default()
        };
        let resolved = resolve(&cfg);
        assert_eq!(resolved.tier, EncoderTier::Fallback);
        let out = resolved.encoder.encode(&["hello".to_string()])?;
        assert_eq!(out[0].len(), crate::EMBEDDING_DIM);
        Ok(())
    }
}
