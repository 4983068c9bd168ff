//! Download management and processing

pub mod error;
pub mod job;
pub mod orchestrator;
pub mod progress;
pub mod send;
pub mod session;
pub mod ytdlp;
pub mod ytdlp_errors;

// Re-exports for convenience
pub use error::DownloadError;
pub use job::{DownloadJob, JobOutcome, JobState, MediaMode};
pub use orchestrator::{DownloadOrchestrator, OrchestratorConfig};
pub use progress::{parse_percent, ProgressParser};
pub use send::{ChatGateway, MessageHandle};
pub use session::{PutOutcome, SessionError, SessionStore};
pub use ytdlp::{DownloadRequest, ProcessRunner, RunningDownload, YtDlpRunner};
