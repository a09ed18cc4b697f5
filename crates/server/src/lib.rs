//! HTTP API for batch text embedding generation.
//!
//! This crate wraps the `encoder` crate's tiered embedding pipeline in a thin
//! Axum transport. The encoder is resolved once at startup; the server binds
//! its listener immediately and reports `ready: false` from `/health` until
//! resolution completes.
//!
//! # Endpoints
//!
//! - `GET /` - Service banner and configured model
//! - `GET /health` - Liveness plus encoder readiness
//! - `POST /embed` - Embed a batch of up to 100 texts
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! Configuration comes from the environment: `HOST` (default `127.0.0.1`),
//! `PORT` (default `8000`), `MODEL` (default `nomic-ai/nomic-embed-text-v2-moe`).

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use server::{build_router, start_server};
pub use state::AppState;
