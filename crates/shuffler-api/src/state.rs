//! Shared application state.

use std::sync::Arc;

use shuffler_engine::application::service::EngineService;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The running selection engine.
    pub engine: Arc<EngineService>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(engine: Arc<EngineService>) -> Self {
        Self { engine }
    }
}
