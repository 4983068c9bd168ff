//! LinkDrop - Telegram bot that turns media links into video or audio files
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, process helpers
//! - `download`: session store, yt-dlp runner, progress parsing, orchestrator
//! - `telegram`: Telegram gateway, menu and dispatcher handlers

pub mod cli;
pub mod console;
pub mod core;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use download::{DownloadOrchestrator, MediaMode, OrchestratorConfig, SessionStore};
