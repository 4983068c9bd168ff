use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration constants for the bot
/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Folder where yt-dlp writes job artifacts before they are uploaded
/// Read from DOWNLOAD_FOLDER environment variable
/// Defaults to the current working directory
/// Supports tilde (~) expansion for home directory
pub static DOWNLOAD_FOLDER: Lazy<String> = Lazy::new(|| env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| ".".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Custom Bot API server URL (local telegram-bot-api)
/// Read from BOT_API_URL environment variable
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok());

/// Returns the download folder with `~` expanded
pub fn download_dir() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DOWNLOAD_FOLDER.as_str()).into_owned())
}

/// Download configuration
pub mod download {
    use super::{env, Duration, Lazy};

    /// Size cap handed to yt-dlp via `--max-filesize`
    pub const MAX_FILESIZE: &str = "50M";

    /// Default hard deadline for one yt-dlp run (in seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 600; // 10 minutes

    /// Hard deadline for one yt-dlp run
    /// Read from DOWNLOAD_TIMEOUT_SECS environment variable
    pub static TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("DOWNLOAD_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    });

    /// Download deadline duration
    pub fn timeout() -> Duration {
        Duration::from_secs(*TIMEOUT_SECS)
    }

    /// How long a killed yt-dlp gets to be reaped before the job moves on (in seconds)
    pub const KILL_GRACE_SECS: u64 = 5;

    /// Kill grace duration
    pub fn kill_grace() -> Duration {
        Duration::from_secs(KILL_GRACE_SECS)
    }

    /// How many trailing stderr lines of yt-dlp are kept for diagnostics
    pub const STDERR_TAIL_LINES: usize = 200;
}

/// Progress message configuration
pub mod progress {
    use super::Duration;

    /// Minimum interval between two edits of the same status message (in seconds)
    /// Telegram rejects bursts of edits with 429, so updates inside the window are dropped
    pub const UPDATE_INTERVAL_SECS: u64 = 3;

    /// Status edit interval duration
    pub fn update_interval() -> Duration {
        Duration::from_secs(UPDATE_INTERVAL_SECS)
    }
}

/// Process execution configuration
pub mod process {
    use super::Duration;

    /// Timeout for short yt-dlp queries such as `--version` (in seconds)
    pub const YTDLP_QUERY_TIMEOUT_SECS: u64 = 30;

    /// yt-dlp query timeout duration
    pub fn ytdlp_query_timeout() -> Duration {
        Duration::from_secs(YTDLP_QUERY_TIMEOUT_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for HTTP requests (in seconds)
    /// Large enough for 50 MB uploads on slow links
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
