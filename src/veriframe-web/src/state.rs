//! Shared application state

use std::sync::Arc;
use veriframe_analysis::Orchestrator;

/// Shared state across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Analysis pipeline, shared by all requests
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    /// Create new application state
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}
