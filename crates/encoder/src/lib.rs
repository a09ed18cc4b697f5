//! Tiered text embedding encoders.
//!
//! This crate turns batches of text into fixed-dimension vectors (768 floats)
//! for similarity search. Callers never pick an implementation directly; the
//! resolver probes three tiers in priority order at startup and hands back
//! whichever one came up first:
//!
//! - **Managed mode** - A hosted inference endpoint bound to the configured
//!   model. Highest quality, needs network (and usually a token).
//! - **ONNX mode** - Tokenizer + model weights fetched from the hub and run
//!   locally. Needs the weights to be downloadable once.
//! - **Fallback mode** - A deterministic character-hash embedder with zero
//!   external dependencies. Always constructs, never fails.
//!
//! The nice thing is the degradation behavior. If the endpoint is down or the
//! weights can't be fetched, resolution quietly moves to the next tier instead
//! of taking the process down. The fallback isn't semantically meaningful, but
//! it keeps the service contract intact (right dimension, valid unit vectors).
//!
//! ## Quick example
//!
//! ```no_run
//! use encoder::{resolve, EmbeddingService, EncoderConfig};
//!
//! let cfg = EncoderConfig::for_model("nomic-ai/nomic-embed-text-v2-moe");
//! let service = EmbeddingService::new(cfg.model_name.clone());
//! service.activate(resolve(&cfg));
//!
//! let texts = vec!["hello world".to_string()];
//! let output = service.embed(&texts, None).unwrap();
//! assert_eq!(output.embeddings.len(), 1);
//! assert_eq!(output.embeddings[0].len(), 768);
//! ```
//!
//! ## Env vars to know
//!
//! - `EMBED_API_URL` - Override the managed-tier inference endpoint
//! - `HF_TOKEN` - Token for the managed endpoint and hub downloads

pub mod config;
pub mod error;
pub mod service;
pub mod types;

mod fallback;
mod managed;
mod normalize;
mod onnx;
mod resolver;

pub use crate::config::EncoderConfig;
pub use crate::error::EncoderError;
pub use crate::fallback::FallbackEncoder;
pub use crate::managed::ManagedEncoder;
pub use crate::onnx::OnnxEncoder;
pub use crate::resolver::{resolve, ResolvedEncoder};
pub use crate::service::{EmbedError, EmbedOutput, EmbeddingService};
pub use crate::types::{Embedding, EncoderTier, EMBEDDING_DIM};

/// Capability shared by all three tiers. One encoder instance serves the whole
/// process, so implementations must either be reentrant or serialize
/// internally; `encode` may block on CPU-bound numeric work.
pub trait Encoder: Send + Sync {
    /// Embeds every text in the batch, preserving input order.
    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>, EncoderError>;

    /// Output dimension, 768 for every tier in this design.
    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}
