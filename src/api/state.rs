//! Application state for the savings engine API.

use std::sync::Arc;

use crate::config::EngineConfig;

/// Shared application state.
///
/// Holds the engine configuration loaded at startup. It is read-only, so
/// concurrent requests share it without locking.
#[derive(Clone)]
pub struct AppState {
    config: Arc<EngineConfig>,
}

impl AppState {
    /// Creates a new application state with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
