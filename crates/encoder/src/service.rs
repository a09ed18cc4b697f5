use std::sync::OnceLock;
use thiserror::Error;

use crate::resolver::ResolvedEncoder;
use crate::types::Embedding;

/// Hard cap on batch size, matching the transport contract.
pub const MAX_BATCH_SIZE: usize = 100;

/// Request-level failures. The transport layer maps these onto HTTP statuses;
/// the `Display` strings are the user-visible `detail` messages.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Startup resolution hasn't completed yet. Retryable.
    #[error("Model not loaded")]
    NotReady,
    /// Empty batch. The caller must fix the request.
    #[error("No texts provided")]
    EmptyBatch,
    /// Batch exceeds [`MAX_BATCH_SIZE`].
    #[error("Too many texts (max {MAX_BATCH_SIZE})")]
    BatchTooLarge,
    /// The active encoder failed mid-encode; the underlying message is passed
    /// through opaquely. Not retried here.
    #[error("{0}")]
    Encoding(String),
}

/// Successful embed result: vectors in input order plus response metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedOutput {
    pub embeddings: Vec<Embedding>,
    /// Label only; it never reflects which encoder actually ran.
    pub model: String,
    /// Whitespace-delimited word count across all inputs. The fallback tier
    /// has no tokenizer, so words are the usage proxy for every tier.
    pub words: usize,
}

/// Stateless request handler over the process-wide encoder.
///
/// The service starts `Uninitialized` and moves to `Ready` exactly once, when
/// startup resolution calls [`activate`](Self::activate). The `OnceLock`
/// write gives every later reader a happens-before edge, so no request ever
/// observes a partially-constructed encoder. A failed encode does not change
/// service state.
pub struct EmbeddingService {
    model_name: String,
    active: OnceLock<ResolvedEncoder>,
}

impl EmbeddingService {
    /// Creates the service in the `Uninitialized` state. `model_name` is the
    /// deploy-time identifier reported by health checks even before
    /// resolution completes.
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            active: OnceLock::new(),
        }
    }

    /// One-way `Uninitialized -> Ready` transition. Returns `false` if an
    /// encoder was already active (the late arrival is dropped).
    pub fn activate(&self, resolved: ResolvedEncoder) -> bool {
        self.active.set(resolved).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.active.get().is_some()
    }

    /// The configured model identifier.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Validates the batch, runs the active encoder, and shapes the result.
    ///
    /// `requested_model` only relabels the response; only one encoder is ever
    /// loaded per process. May block on CPU-bound numeric work, so callers on
    /// an async runtime should wrap this in a blocking task.
    pub fn embed(
        &self,
        texts: &[String],
        requested_model: Option<&str>,
    ) -> Result<EmbedOutput, EmbedError> {
        let resolved = self.active.get().ok_or(EmbedError::NotReady)?;

        if texts.is_empty() {
            return Err(EmbedError::EmptyBatch);
        }
        if texts.len() > MAX_BATCH_SIZE {
            return Err(EmbedError::BatchTooLarge);
        }

        tracing::info!(count = texts.len(), "embedding batch");
        let embeddings = resolved
            .encoder
            .encode(texts)
            .map_err(|e| EmbedError::Encoding(e.to_string()))?;

        let words = texts.iter().map(|t| t.split_whitespace().count()).sum();
        let model = requested_model
            .unwrap_or(&resolved.model_name)
            .to_string();

        Ok(EmbedOutput {
            embeddings,
            model,
            words,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EncoderTier, EMBEDDING_DIM};
    use crate::{Encoder, EncoderError, FallbackEncoder};
    use std::sync::Arc;

    fn ready_service() -> EmbeddingService {
        let service = EmbeddingService::new("test-model");
        service.activate(ResolvedEncoder {
            encoder: Arc::new(FallbackEncoder::new()),
            tier: EncoderTier::Fallback,
            model_name: "test-model".into(),
        });
        service
    }

    fn batch(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn not_ready_before_activation() {
        let service = EmbeddingService::new("test-model");
        assert!(!service.is_ready());
        let err = service.embed(&batch(&["hi"]), None).unwrap_err();
        assert!(matches!(err, EmbedError::NotReady));
        assert_eq!(err.to_string(), "Model not loaded");
    }

    #[test]
    fn activation_is_one_way() {
        let service = ready_service();
        assert!(service.is_ready());

        let second = ResolvedEncoder {
            encoder: Arc::new(FallbackEncoder::new()),
            tier: EncoderTier::Fallback,
            model_name: "other-model".into(),
        };
        assert!(!service.activate(second));
        // The first activation's label still wins.
        let out = service.embed(&batch(&["hi"]), None).unwrap();
        assert_eq!(out.model, "test-model");
    }

    #[test]
    fn rejects_empty_batch() {
        let err = ready_service().embed(&[], None).unwrap_err();
        assert!(matches!(err, EmbedError::EmptyBatch));
        assert_eq!(err.to_string(), "No texts provided");
    }

    #[test]
    fn rejects_oversized_batch() {
        let texts = vec!["x".to_string(); MAX_BATCH_SIZE + 1];
        let err = ready_service().embed(&texts, None).unwrap_err();
        assert!(matches!(err, EmbedError::BatchTooLarge));
        assert_eq!(err.to_string(), "Too many texts (max 100)");
    }

    #[test]
    fn accepts_batch_at_limit() {
        let texts = vec!["x".to_string(); MAX_BATCH_SIZE];
        let out = ready_service().embed(&texts, None).unwrap();
        assert_eq!(out.embeddings.len(), MAX_BATCH_SIZE);
    }

    #[test]
    fn output_aligns_with_input_order() {
        let service = ready_service();
        let texts = batch(&["first text", "second text", "third text"]);
        let out = service.embed(&texts, None).unwrap();
        assert_eq!(out.embeddings.len(), 3);
        for (i, text) in texts.iter().enumerate() {
            let single = service.embed(&[text.clone()], None).unwrap();
            assert_eq!(out.embeddings[i], single.embeddings[0]);
            assert_eq!(out.embeddings[i].len(), EMBEDDING_DIM);
        }
    }

    #[test]
    fn requested_model_relabels_only() {
        let service = ready_service();
        let texts = batch(&["hello"]);
        let default = service.embed(&texts, None).unwrap();
        let relabeled = service.embed(&texts, Some("my-alias")).unwrap();
        assert_eq!(default.model, "test-model");
        assert_eq!(relabeled.model, "my-alias");
        // Same encoder ran either way.
        assert_eq!(default.embeddings, relabeled.embeddings);
    }

    #[test]
    fn usage_counts_whitespace_words() {
        let out = ready_service()
            .embed(&batch(&["a b c", "d e"]), None)
            .unwrap();
        assert_eq!(out.words, 5);
    }

    struct ExplodingEncoder;

    impl Encoder for ExplodingEncoder {
        fn encode(&self, _texts: &[String]) -> Result<Vec<Embedding>, EncoderError> {
            Err(EncoderError::Inference("session run failed".into()))
        }
    }

    #[test]
    fn encoder_failure_is_surfaced_and_state_unchanged() {
        let service = EmbeddingService::new("test-model");
        service.activate(ResolvedEncoder {
            encoder: Arc::new(ExplodingEncoder),
            tier: EncoderTier::Onnx,
            model_name: "test-model".into(),
        });

        let err = service.embed(&batch(&["hi"]), None).unwrap_err();
        match err {
            EmbedError::Encoding(msg) => assert!(msg.contains("session run failed")),
            other => panic!("expected Encoding, got {other:?}"),
        }
        // Still Ready afterwards; a failed encode is not a state change.
        assert!(service.is_ready());
    }
}
