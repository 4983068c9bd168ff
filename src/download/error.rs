use std::fmt;

/// Structured error type for download operations.
///
/// Categorized variants keep logging and the user-facing classification apart:
/// every variant except `Timeout` is shown to the user as the same generic notice.
#[derive(Debug)]
pub enum DownloadError {
    /// yt-dlp exited with a non-zero status (size cap, unsupported URL, network, crash)
    YtDlp(String),
    /// yt-dlp exited cleanly but the expected file is missing (skipped by `--max-filesize`)
    FileNotFound(String),
    /// Download exceeded the wall-clock deadline and the process was killed
    Timeout(String),
    /// Process execution failure (spawn, wait, pipe)
    Process(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for DownloadError {}

impl DownloadError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::YtDlp(_) => "ytdlp",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::Process(_) => "process",
        }
    }

    /// Returns the inner message
    pub fn message(&self) -> &str {
        match self {
            DownloadError::YtDlp(msg)
            | DownloadError::FileNotFound(msg)
            | DownloadError::Timeout(msg)
            | DownloadError::Process(msg) => msg,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DownloadError::Timeout(_))
    }
}
