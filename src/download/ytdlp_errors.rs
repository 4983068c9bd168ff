//! yt-dlp failure analysis
//!
//! yt-dlp only reports success or failure through its exit code. The tail of
//! its output is inspected here so logs carry a sharper cause; the user still
//! gets one generic failure notice.

/// Failure causes recognised in yt-dlp output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YtDlpErrorType {
    /// `--max-filesize` rejected the file
    FileTooLarge,
    /// Private, removed, geo-blocked or login-walled media
    Unavailable,
    /// No extractor for the URL
    UnsupportedUrl,
    /// Timeouts, DNS, refused connections
    NetworkError,
    /// Anything else
    Unknown,
}

/// Classifies yt-dlp diagnostic output (stdout tail + stderr tail)
pub fn analyze_ytdlp_error(output: &str) -> YtDlpErrorType {
    let lower = output.to_lowercase();

    if lower.contains("larger than max-filesize") || lower.contains("file is larger than") {
        return YtDlpErrorType::FileTooLarge;
    }

    if lower.contains("unsupported url") || lower.contains("no suitable extractor") {
        return YtDlpErrorType::UnsupportedUrl;
    }

    if lower.contains("private video")
        || lower.contains("video unavailable")
        || lower.contains("is not available")
        || lower.contains("has been removed")
        || lower.contains("login required")
        || lower.contains("sign in to confirm")
        || lower.contains("http error 403")
        || lower.contains("http error 404")
    {
        return YtDlpErrorType::Unavailable;
    }

    if lower.contains("timed out")
        || lower.contains("connection")
        || lower.contains("network")
        || lower.contains("name resolution")
        || lower.contains("failed to connect")
    {
        return YtDlpErrorType::NetworkError;
    }

    YtDlpErrorType::Unknown
}

/// Short operator-facing description for logs
pub fn describe(error_type: YtDlpErrorType) -> &'static str {
    match error_type {
        YtDlpErrorType::FileTooLarge => "file exceeds the size cap",
        YtDlpErrorType::Unavailable => "media unavailable (private, removed, or restricted)",
        YtDlpErrorType::UnsupportedUrl => "unsupported URL",
        YtDlpErrorType::NetworkError => "network problem",
        YtDlpErrorType::Unknown => "unknown yt-dlp failure",
    }
}
