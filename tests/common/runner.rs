//! Process runner double that replays a scripted yt-dlp run

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use linkdrop::download::{DownloadError, DownloadRequest, ProcessRunner, RunningDownload};
use tokio::sync::{mpsc, oneshot};

/// How the scripted process ends once its lines are emitted
#[derive(Debug, Clone)]
pub enum ScriptedExit {
    /// Exit 0 with the output file written
    Success,
    /// Exit 0 without producing a file
    SuccessWithoutFile,
    /// Non-zero exit, leaving a `.part` file and a format intermediate behind
    Failure(String),
    /// Never exits
    Hang,
}

#[derive(Debug)]
pub struct ScriptedRunner {
    lines: Vec<String>,
    line_delay: Duration,
    exit: ScriptedExit,
    fail_launch: bool,
    launches: AtomicUsize,
    requests: Mutex<Vec<DownloadRequest>>,
    killed: Arc<AtomicBool>,
}

impl ScriptedRunner {
    pub fn new(exit: ScriptedExit) -> Self {
        Self {
            lines: Vec::new(),
            line_delay: Duration::ZERO,
            exit,
            fail_launch: false,
            launches: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            killed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A runner whose binary cannot be spawned
    pub fn unlaunchable() -> Self {
        Self {
            fail_launch: true,
            ..Self::new(ScriptedExit::Success)
        }
    }

    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Delay before each emitted line
    pub fn with_line_delay(mut self, delay: Duration) -> Self {
        self.line_delay = delay;
        self
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// True once the orchestrator asked the process to be killed
    pub fn was_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn launch(&self, request: &DownloadRequest) -> Result<RunningDownload, DownloadError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_launch {
            return Err(DownloadError::Process("failed to spawn yt-dlp: not found".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (kill, kill_rx) = oneshot::channel::<()>();
        let lines = self.lines.clone();
        let delay = self.line_delay;
        let exit = self.exit.clone();
        let output_path = request.output_path.clone();
        let killed = Arc::clone(&self.killed);

        let handle = tokio::spawn(async move {
            let script = async move {
                for line in lines {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let _ = tx.send(line);
                }

                match exit {
                    ScriptedExit::Success => std::fs::write(&output_path, b"media")
                        .map_err(|e| DownloadError::Process(format!("scripted write failed: {}", e))),
                    ScriptedExit::SuccessWithoutFile => Err(DownloadError::FileNotFound(format!(
                        "yt-dlp exited successfully but {} is missing",
                        output_path.display()
                    ))),
                    ScriptedExit::Failure(message) => {
                        leave_partials(&output_path);
                        Err(DownloadError::YtDlp(message))
                    }
                    ScriptedExit::Hang => {
                        let _open = tx;
                        std::future::pending::<()>().await;
                        Ok(())
                    }
                }
            };

            tokio::select! {
                result = script => result,
                _ = kill_rx => {
                    killed.store(true, Ordering::SeqCst);
                    Err(DownloadError::Timeout("scripted yt-dlp killed".into()))
                }
            }
        });

        Ok(RunningDownload {
            lines: rx,
            exit: handle,
            kill,
        })
    }
}

/// Writes what an interrupted merge download leaves behind
fn leave_partials(output_path: &Path) {
    let mut partial = output_path.to_path_buf().into_os_string();
    partial.push(".part");
    let _ = std::fs::write(partial, b"partial");

    if let (Some(dir), Some(stem)) = (output_path.parent(), output_path.file_stem()) {
        let intermediate = dir.join(format!("{}.f137.mp4", stem.to_string_lossy()));
        let _ = std::fs::write(intermediate, b"partial");
    }
}
