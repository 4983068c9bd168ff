//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod gateway;
pub mod runner;

#[allow(unused_imports)]
pub use gateway::{GatewayCall, RecordingGateway};
#[allow(unused_imports)]
pub use runner::{ScriptedExit, ScriptedRunner};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use linkdrop::download::ProgressParser;
use linkdrop::{DownloadOrchestrator, OrchestratorConfig, SessionStore};

/// Orchestrator config writing into `dir` with the production throttle window
#[allow(dead_code)]
pub fn test_config(dir: &Path) -> OrchestratorConfig {
    OrchestratorConfig {
        download_dir: dir.to_path_buf(),
        update_interval: Duration::from_secs(3),
        download_timeout: Duration::from_secs(60),
    }
}

/// Wires an orchestrator to the given doubles with a fresh session store
#[allow(dead_code)]
pub fn orchestrator(
    gateway: &Arc<RecordingGateway>,
    runner: &Arc<ScriptedRunner>,
    config: OrchestratorConfig,
) -> DownloadOrchestrator {
    DownloadOrchestrator::new(
        gateway.clone(),
        runner.clone(),
        Arc::new(SessionStore::new()),
        ProgressParser,
        config,
    )
}
