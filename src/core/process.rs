//! Process execution utilities with timeout support
//!
//! Short, non-streaming yt-dlp queries (`--version`) go through here so a hung
//! binary can't block startup or the CLI.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::core::error::AppError;
use crate::download::error::DownloadError;

/// Run an async Command with a timeout.
///
/// Returns the process Output on success, or an AppError on timeout/IO failure.
pub async fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, AppError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(AppError::Io(e)),
        Err(_) => Err(AppError::Download(DownloadError::Timeout(format!(
            "Process timed out after {}s",
            timeout.as_secs()
        )))),
    }
}
