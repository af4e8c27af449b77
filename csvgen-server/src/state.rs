//! Shared application state for the HTTP server.

use std::sync::Arc;

use csvgen::config::ServiceConfig;
use csvgen::writer::ArtifactWriter;

/// State accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Configuration resolved once at startup.
    pub config: Arc<ServiceConfig>,
    /// Writer bound to the shared upload directory.
    pub writer: Arc<ArtifactWriter>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let writer = ArtifactWriter::new(config.clone());
        Self {
            config: Arc::new(config),
            writer: Arc::new(writer),
        }
    }
}
