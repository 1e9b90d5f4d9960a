// Application state module
// Immutable state shared by every request handler

use std::sync::Arc;

use super::types::Config;
use crate::scan::ScanRunner;

/// Application state
pub struct AppState {
    pub config: Config,
    pub runner: Arc<dyn ScanRunner>,
}

impl AppState {
    pub fn new(config: Config, runner: Arc<dyn ScanRunner>) -> Self {
        Self { config, runner }
    }

    /// Scanner device every request is sent to
    pub fn device(&self) -> &str {
        &self.config.scanner.device
    }
}
