//! Handler types and dependencies

use std::sync::Arc;

use crate::download::orchestrator::DownloadOrchestrator;
use crate::download::session::SessionStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub sessions: Arc<SessionStore>,
    pub orchestrator: Arc<DownloadOrchestrator>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(orchestrator: Arc<DownloadOrchestrator>) -> Self {
        Self {
            sessions: Arc::clone(orchestrator.sessions()),
            orchestrator,
        }
    }
}
