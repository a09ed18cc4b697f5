use crate::config::ServerConfig;
use encoder::EmbeddingService;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Embedding service (shared across requests). Starts unresolved; the
    /// startup task activates it once resolution completes.
    pub service: Arc<EmbeddingService>,
}

impl AppState {
    /// Create new server state with an unresolved embedding service.
    pub fn new(config: ServerConfig) -> Self {
        let service = Arc::new(EmbeddingService::new(config.model.clone()));
        Self {
            config: Arc::new(config),
            service,
        }
    }
}
