use std::io;
use thiserror::Error;

/// Errors surfaced while constructing or running an encoder.
///
/// During resolution every variant is non-fatal: the resolver logs it and
/// moves on to the next tier. After resolution, `Inference` is the only
/// variant the active encoder should produce.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// The configured model cannot be served by this tier (unknown identifier,
    /// wrong output dimension, missing ONNX export).
    #[error("unsupported model: {0}")]
    Unsupported(String),
    /// Unable to reach the inference endpoint or download model assets.
    #[error("download failed: {0}")]
    Download(String),
    /// Low-level IO failures while touching the filesystem.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Tokenizer, session, or response-shape errors during encoding.
    #[error("inference failure: {0}")]
    Inference(String),
}
