//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Startup diagnostics for the download environment

use anyhow::Result;
use simplelog::*;
use std::fs::File;
use std::path::PathBuf;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the resolved download configuration at application startup
///
/// Checks that the yt-dlp binary can be resolved and that the download
/// folder exists, and prints the limits every job runs under.
pub fn log_startup_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("⚙️  Download Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let ytdl_bin = config::YTDL_BIN.as_str();
    if let Some(resolved) = resolve_binary(ytdl_bin) {
        log::info!("✅ YTDL_BIN: {} ({})", ytdl_bin, resolved.display());
    } else {
        log::error!("❌ YTDL_BIN: {} (NOT FOUND!)", ytdl_bin);
        log::error!("   Every download will fail until yt-dlp is installed");
        log::error!("   Install: pip3 install -U yt-dlp  (or set YTDL_BIN)");
    }

    let download_dir = config::download_dir();
    if download_dir.is_dir() {
        log::info!("✅ DOWNLOAD_FOLDER: {}", download_dir.display());
    } else {
        log::warn!(
            "⚠️  DOWNLOAD_FOLDER: {} does not exist yet, it will be created on first job",
            download_dir.display()
        );
    }

    log::info!("📦 Max file size: {}", config::download::MAX_FILESIZE);
    log::info!("⏱️  Download deadline: {}s", config::download::timeout().as_secs());
    log::info!(
        "🔁 Status update interval: {}s",
        config::progress::update_interval().as_secs()
    );
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Resolves `bin` as a path or through `PATH`
fn resolve_binary(bin: &str) -> Option<PathBuf> {
    which::which(bin).ok()
}
