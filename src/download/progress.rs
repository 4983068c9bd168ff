//! Progress parsing and status message rendering
//!
//! yt-dlp is run with `--newline`, so every progress tick arrives as its own
//! stdout line (`[download]  42.7% of ~10.00MiB at 1.20MiB/s ETA 00:07`).

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tokio::time::Instant;

use crate::download::job::MediaMode;

/// Cached regex for the `<digits>.<digits>%` progress token
/// Compiled once at startup and reused for all jobs
static PERCENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.\d+)%").expect("Failed to compile progress regex"));

/// Extracts the percentage from one line of yt-dlp output.
///
/// Only the first `<digits>.<digits>%` token counts. The returned slice borrows
/// from `line` and keeps yt-dlp's own formatting (`"42.7"`, `"100.0"`).
pub fn parse_percent(line: &str) -> Option<&str> {
    PERCENT_REGEX
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Stateless progress parser handed to the orchestrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressParser;

impl ProgressParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse<'a>(&self, line: &'a str) -> Option<&'a str> {
        parse_percent(line)
    }
}

/// Rate gate for status message edits.
///
/// The window starts when the status message is created, so the first
/// progress edit goes out no earlier than one interval after that.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last_update: Instant,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_update: Instant::now(),
        }
    }

    /// Returns true and restarts the window if an edit may be sent now.
    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }

    pub fn ready_at(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_update) >= self.interval {
            self.last_update = now;
            true
        } else {
            false
        }
    }
}

/// Download state for displaying progress to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    /// Status message just created, yt-dlp is being launched
    Initializing { mode: MediaMode },
    /// yt-dlp reported a percentage
    Downloading { mode: MediaMode, percent: String },
    /// File is being sent to the chat
    Uploading,
    /// yt-dlp failed for any reason other than the deadline
    DownloadFailed,
    /// yt-dlp was killed after the deadline
    TimedOut { secs: u64 },
    /// The chat platform rejected the file
    UploadFailed,
}

impl DownloadStatus {
    /// Generates the plain-text status message for the current state.
    ///
    /// # Example
    ///
    /// ```
    /// use linkdrop::download::job::MediaMode;
    /// use linkdrop::download::progress::DownloadStatus;
    ///
    /// let status = DownloadStatus::Downloading {
    ///     mode: MediaMode::Audio,
    ///     percent: "42.7".to_string(),
    /// };
    /// assert_eq!(status.to_message(), "⏳ Downloading audio: 42.7%");
    /// ```
    pub fn to_message(&self) -> String {
        match self {
            DownloadStatus::Initializing { mode } => format!("⏳ Initializing {}...", mode),
            DownloadStatus::Downloading { mode, percent } => format!("⏳ Downloading {}: {}%", mode, percent),
            DownloadStatus::Uploading => "📤 Uploading to Telegram...".to_string(),
            DownloadStatus::DownloadFailed => "❌ File exceeds 50MB limit or download failed.".to_string(),
            DownloadStatus::TimedOut { secs } => format!("⌛ Download timed out after {} seconds.", secs),
            DownloadStatus::UploadFailed => "❌ Telegram upload failed (Max 50MB).".to_string(),
        }
    }
}
