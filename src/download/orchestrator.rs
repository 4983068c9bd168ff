//! Download orchestrator
//!
//! Drives one job from a mode selection to a terminal state:
//! `Idle → Initializing → Downloading → Uploading → Done`, with
//! `FailedDownload` and `FailedUpload` as the failure exits. Every terminal
//! state removes the session entry and the job's files, whether or not the
//! status message could be updated.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use teloxide::types::{ChatId, UserId};

use crate::core::config;
use crate::download::error::DownloadError;
use crate::download::job::{DownloadJob, JobOutcome, JobState, MediaMode};
use crate::download::progress::{DownloadStatus, ProgressParser, ProgressThrottle};
use crate::download::send::{ChatGateway, MessageHandle};
use crate::download::session::{SessionError, SessionStore};
use crate::download::ytdlp::{DownloadRequest, ProcessRunner, RunningDownload};
use crate::download::ytdlp_errors::{analyze_ytdlp_error, describe};

pub const MISSING_SESSION_TEXT: &str = "Please send the link again.";
pub const BUSY_TEXT: &str = "⏳ Your previous download is still in progress.";

/// Tunables of the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Directory job artifacts are written to
    pub download_dir: PathBuf,
    /// Minimum interval between two status edits
    pub update_interval: Duration,
    /// Hard deadline for the yt-dlp run
    pub download_timeout: Duration,
}

impl OrchestratorConfig {
    pub fn from_env() -> Self {
        Self {
            download_dir: config::download_dir(),
            update_interval: config::progress::update_interval(),
            download_timeout: config::download::timeout(),
        }
    }
}

/// Runs download jobs against injected chat, process and session collaborators.
pub struct DownloadOrchestrator {
    gateway: Arc<dyn ChatGateway>,
    runner: Arc<dyn ProcessRunner>,
    sessions: Arc<SessionStore>,
    parser: ProgressParser,
    config: OrchestratorConfig,
}

impl DownloadOrchestrator {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        runner: Arc<dyn ProcessRunner>,
        sessions: Arc<SessionStore>,
        parser: ProgressParser,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            runner,
            sessions,
            parser,
            config,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Handles a mode button press for `user` in `chat`.
    ///
    /// Never returns an error: every gateway or process failure is turned
    /// into a user-visible notice and a [`JobOutcome`].
    pub async fn handle_mode_selection(&self, user: UserId, chat: ChatId, mode: MediaMode) -> JobOutcome {
        let url = match self.sessions.begin(user) {
            Ok(url) => url,
            Err(SessionError::MissingSession) => {
                log::info!("No pending link for user {}, asking to resend", user.0);
                self.reply(chat, MISSING_SESSION_TEXT).await;
                return JobOutcome::MissingSession;
            }
            Err(SessionError::JobInFlight) => {
                log::info!("User {} pressed {} while a job is running", user.0, mode);
                self.reply(chat, BUSY_TEXT).await;
                return JobOutcome::Busy;
            }
        };

        if let Err(e) = fs_err::tokio::create_dir_all(&self.config.download_dir).await {
            log::warn!("Failed to create download folder: {}", e);
        }

        let job = DownloadJob::new(user, chat, mode, url, &self.config.download_dir);
        log::info!(
            "🎯 Job for user {}: {} {} -> {}",
            user.0,
            mode,
            job.source_url,
            job.output_path.display()
        );

        let cleanup = JobCleanup {
            job: &job,
            sessions: &self.sessions,
        };
        let outcome = self.run_job(&job).await;
        drop(cleanup);

        log::info!("🏁 Job for user {} finished: {:?}", user.0, outcome);
        outcome
    }

    async fn run_job(&self, job: &DownloadJob) -> JobOutcome {
        let mut state = JobState::Idle;
        advance(job, &mut state, JobState::Initializing);

        let initializing = DownloadStatus::Initializing { mode: job.mode }.to_message();
        let handle = match self.gateway.send_text(job.chat, &initializing).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Failed to send status message to chat {}: {}", job.chat.0, e);
                None
            }
        };
        let status = StatusMessage {
            gateway: &*self.gateway,
            handle,
        };

        if let Err(e) = self.download(job, &mut state, &status).await {
            advance(job, &mut state, JobState::FailedDownload);
            let cause = analyze_ytdlp_error(e.message());
            log::error!(
                "❌ Download failed for user {} [{}] ({}): {}",
                job.user.0,
                e.subcategory(),
                describe(cause),
                e
            );

            let text = if e.is_timeout() {
                DownloadStatus::TimedOut {
                    secs: self.config.download_timeout.as_secs(),
                }
            } else {
                DownloadStatus::DownloadFailed
            };
            status.edit(&text.to_message()).await;
            return JobOutcome::FailedDownload {
                timed_out: e.is_timeout(),
            };
        }

        advance(job, &mut state, JobState::Uploading);
        status.edit(&DownloadStatus::Uploading.to_message()).await;

        let sent = match job.mode {
            MediaMode::Audio => self.gateway.send_audio(job.chat, &job.output_path).await,
            MediaMode::Video => self.gateway.send_video(job.chat, &job.output_path).await,
        };

        match sent {
            Ok(()) => {
                advance(job, &mut state, JobState::Done);
                status.delete().await;
                JobOutcome::Done {
                    output_path: job.output_path.clone(),
                }
            }
            Err(e) => {
                log::error!("❌ Upload failed for user {}: {}", job.user.0, e);
                advance(job, &mut state, JobState::FailedUpload);
                status.edit(&DownloadStatus::UploadFailed.to_message()).await;
                JobOutcome::FailedUpload
            }
        }
    }

    /// Launches yt-dlp and follows it until exit or deadline.
    async fn download(
        &self,
        job: &DownloadJob,
        state: &mut JobState,
        status: &StatusMessage<'_>,
    ) -> Result<(), DownloadError> {
        let mut throttle = ProgressThrottle::new(self.config.update_interval);
        let RunningDownload { mut lines, mut exit, kill } = self.runner.launch(&DownloadRequest::from(job)).await?;
        advance(job, state, JobState::Downloading);

        let deadline = self.config.download_timeout;

        let follow = async {
            while let Some(line) = lines.recv().await {
                let Some(percent) = self.parser.parse(&line) else {
                    continue;
                };
                if throttle.ready() {
                    let text = DownloadStatus::Downloading {
                        mode: job.mode,
                        percent: percent.to_string(),
                    }
                    .to_message();
                    status.edit(&text).await;
                }
            }

            match (&mut exit).await {
                Ok(result) => result,
                Err(e) => Err(DownloadError::Process(format!("yt-dlp task failed: {}", e))),
            }
        };
        let followed = tokio::time::timeout(deadline, follow).await;

        match followed {
            Ok(result) => result,
            Err(_) => {
                log::warn!(
                    "⌛ yt-dlp for user {} hit the {}s deadline, killing it",
                    job.user.0,
                    deadline.as_secs()
                );
                let _ = kill.send(());
                // cleanup must not run before the process tree is gone
                if tokio::time::timeout(config::download::kill_grace(), &mut exit)
                    .await
                    .is_err()
                {
                    log::error!("yt-dlp for user {} did not exit after kill", job.user.0);
                    exit.abort();
                }
                Err(DownloadError::Timeout(format!(
                    "yt-dlp did not finish within {}s",
                    deadline.as_secs()
                )))
            }
        }
    }

    /// Best-effort one-off reply outside of a job's status message
    async fn reply(&self, chat: ChatId, text: &str) {
        if let Err(e) = self.gateway.send_text(chat, text).await {
            log::warn!("Failed to reply to chat {}: {}", chat.0, e);
        }
    }
}

fn advance(job: &DownloadJob, state: &mut JobState, next: JobState) {
    debug_assert!(state.can_transition_to(next), "illegal transition {} -> {}", state, next);
    log::info!("Job {} for user {}: {} -> {}", job.mode, job.user.0, state, next);
    *state = next;
}

/// The job's single status message. Edit and delete failures are logged and
/// swallowed so they can't change the job's outcome.
struct StatusMessage<'a> {
    gateway: &'a dyn ChatGateway,
    handle: Option<MessageHandle>,
}

impl StatusMessage<'_> {
    async fn edit(&self, text: &str) {
        let Some(handle) = self.handle else {
            return;
        };
        if let Err(e) = self.gateway.edit_text(handle, text).await {
            log::warn!("Failed to edit status message in chat {}: {}", handle.chat_id.0, e);
        }
    }

    async fn delete(&self) {
        let Some(handle) = self.handle else {
            return;
        };
        if let Err(e) = self.gateway.delete_message(handle).await {
            log::warn!("Failed to delete status message in chat {}: {}", handle.chat_id.0, e);
        }
    }
}

/// Removes session and artifacts when the job scope ends, including when the
/// job future is dropped midway.
struct JobCleanup<'a> {
    job: &'a DownloadJob,
    sessions: &'a SessionStore,
}

impl Drop for JobCleanup<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.job.cleanup(self.sessions) {
            log::error!(
                "Cleanup of {} for user {} failed: {}",
                self.job.output_path.display(),
                self.job.user.0,
                e
            );
        }
    }
}
