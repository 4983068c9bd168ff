//! Download job model: requested mode, job-scoped output path, state machine

use std::io;
use std::path::{Path, PathBuf};

use strum::{AsRefStr, Display, EnumString};
use teloxide::types::{ChatId, UserId};

use crate::download::session::SessionStore;

/// What the user asked for after sending a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum MediaMode {
    Video,
    Audio,
}

impl MediaMode {
    /// File extension of the produced artifact
    pub fn extension(&self) -> &'static str {
        match self {
            MediaMode::Video => "mp4",
            MediaMode::Audio => "mp3",
        }
    }

    /// Callback data carried by the format selector button
    pub fn callback_data(&self) -> &'static str {
        match self {
            MediaMode::Video => "menu_vid",
            MediaMode::Audio => "menu_aud",
        }
    }

    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            "menu_vid" => Some(MediaMode::Video),
            "menu_aud" => Some(MediaMode::Audio),
            _ => None,
        }
    }

    /// Label of the format selector button
    pub fn button_label(&self) -> &'static str {
        match self {
            MediaMode::Video => "🎬 Video (1080p)",
            MediaMode::Audio => "🎵 Audio (MP3)",
        }
    }
}

/// Orchestration state of one job.
///
/// `Idle` means no job exists yet; `Done`, `FailedDownload` and `FailedUpload`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum JobState {
    Idle,
    Initializing,
    Downloading,
    Uploading,
    Done,
    FailedDownload,
    FailedUpload,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::FailedDownload | JobState::FailedUpload)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Idle, Initializing)
                | (Initializing, Downloading)
                | (Initializing, FailedDownload)
                | (Downloading, FailedDownload)
                | (Downloading, Uploading)
                | (Uploading, Done)
                | (Uploading, FailedUpload)
        )
    }
}

/// What a mode selection ended in, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// No link on record for the user; nothing was launched
    MissingSession,
    /// A job for this user is already running; nothing was launched
    Busy,
    /// File delivered, status message deleted
    Done { output_path: PathBuf },
    /// yt-dlp failed or timed out
    FailedDownload { timed_out: bool },
    /// The chat platform rejected the file
    FailedUpload,
}

impl JobOutcome {
    /// Terminal job state this outcome corresponds to, `None` when no job was created.
    pub fn state(&self) -> Option<JobState> {
        match self {
            JobOutcome::MissingSession | JobOutcome::Busy => None,
            JobOutcome::Done { .. } => Some(JobState::Done),
            JobOutcome::FailedDownload { .. } => Some(JobState::FailedDownload),
            JobOutcome::FailedUpload => Some(JobState::FailedUpload),
        }
    }
}

/// One orchestration cycle for a single user's single download request.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub user: UserId,
    pub chat: ChatId,
    pub mode: MediaMode,
    pub source_url: String,
    pub output_path: PathBuf,
}

impl DownloadJob {
    /// Creates a job whose output path is derived from the user id and the current time.
    pub fn new(user: UserId, chat: ChatId, mode: MediaMode, source_url: String, dir: &Path) -> Self {
        Self::with_timestamp(
            user,
            chat,
            mode,
            source_url,
            dir,
            chrono::Utc::now().timestamp_millis(),
        )
    }

    pub fn with_timestamp(
        user: UserId,
        chat: ChatId,
        mode: MediaMode,
        source_url: String,
        dir: &Path,
        timestamp: i64,
    ) -> Self {
        let output_path = dir.join(output_file_name(user, timestamp, mode));
        Self {
            user,
            chat,
            mode,
            source_url,
            output_path,
        }
    }

    /// Paths yt-dlp may leave behind for this job: the artifact and its partial companions.
    pub fn artifact_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.output_path.clone()];
        for suffix in [".part", ".ytdl"] {
            let mut name = self.output_path.clone().into_os_string();
            name.push(suffix);
            paths.push(PathBuf::from(name));
        }
        paths
    }

    /// Files next to the artifact that share its `dl_<user>_<timestamp>.` prefix.
    ///
    /// Catches yt-dlp's per-format intermediates (`dl_1_2.f137.mp4`,
    /// `dl_1_2.f140.m4a.part`) left behind by a failed merge.
    pub fn sibling_paths(&self) -> Vec<PathBuf> {
        let Some(stem) = self.output_path.file_stem() else {
            return Vec::new();
        };
        let prefix = format!("{}.", stem.to_string_lossy());
        let dir = match self.output_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!("Failed to scan {} for leftovers: {}", dir.display(), e);
                }
                return Vec::new();
            }
        };
        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
            .map(|entry| entry.path())
            .collect()
    }

    /// Removes the session entry and every on-disk artifact of the job.
    ///
    /// Idempotent: an already removed file or session is not an error. All
    /// paths are attempted even if one removal fails; the first failure is returned.
    pub fn cleanup(&self, sessions: &SessionStore) -> io::Result<()> {
        sessions.remove(self.user);

        let mut paths = self.artifact_paths();
        paths.extend(self.sibling_paths());
        paths.sort();
        paths.dedup();

        let mut first_error = None;
        for path in paths {
            match std::fs::remove_file(&path) {
                Ok(()) => log::debug!("🧹 Removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    log::warn!("Failed to remove {}: {}", path.display(), e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// `dl_<user>_<timestamp>.<ext>`
pub fn output_file_name(user: UserId, timestamp: i64, mode: MediaMode) -> String {
    format!("dl_{}_{}.{}", user.0, timestamp, mode.extension())
}
