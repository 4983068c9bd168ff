//! yt-dlp process runner
//!
//! Builds the mode-specific argument list, launches yt-dlp, streams its stdout
//! line by line and reports how the process ended.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::core::config;
use crate::core::error::AppError;
use crate::core::process::run_with_timeout;
use crate::download::error::DownloadError;
use crate::download::job::{DownloadJob, MediaMode};

/// Format selector for video: best AVC stream up to 1080p with m4a audio,
/// then a single-file AVC stream up to 1080p, then anything
pub const VIDEO_FORMAT: &str = "bestvideo[height<=1080][vcodec^=avc1]+bestaudio[ext=m4a]/best[height<=1080][vcodec^=avc1]/best";

/// How many trailing stdout lines are kept next to the stderr tail.
/// yt-dlp prints the `--max-filesize` notice on stdout.
const STDOUT_TAIL_LINES: usize = 20;

/// What to fetch and where to put it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub mode: MediaMode,
    pub source_url: String,
    pub output_path: PathBuf,
}

impl From<&DownloadJob> for DownloadRequest {
    fn from(job: &DownloadJob) -> Self {
        Self {
            mode: job.mode,
            source_url: job.source_url.clone(),
            output_path: job.output_path.clone(),
        }
    }
}

/// Builds the yt-dlp argument list for a request
pub fn build_ytdlp_args(request: &DownloadRequest) -> Vec<String> {
    let output = request.output_path.to_string_lossy().into_owned();
    let mut args: Vec<String> = match request.mode {
        MediaMode::Audio => vec!["-x".into(), "--audio-format".into(), "mp3".into()],
        MediaMode::Video => vec![
            "-f".into(),
            VIDEO_FORMAT.into(),
            "--merge-output-format".into(),
            "mp4".into(),
        ],
    };
    args.extend([
        "--max-filesize".to_string(),
        config::download::MAX_FILESIZE.to_string(),
        "-o".to_string(),
        output,
        "--newline".to_string(),
        request.source_url.clone(),
    ]);
    args
}

/// A launched download.
///
/// `lines` yields yt-dlp's stdout once, in order, and closes when the stream
/// ends. `exit` resolves after the process has exited and been reaped.
/// Sending on `kill` (or dropping it) kills yt-dlp together with every helper
/// it spawned, after which `exit` resolves with [`DownloadError::Timeout`].
pub struct RunningDownload {
    pub lines: mpsc::UnboundedReceiver<String>,
    pub exit: JoinHandle<Result<(), DownloadError>>,
    pub kill: oneshot::Sender<()>,
}

/// Launches the external retrieval tool for a request
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn launch(&self, request: &DownloadRequest) -> Result<RunningDownload, DownloadError>;
}

/// [`ProcessRunner`] backed by the yt-dlp binary
#[derive(Debug, Clone)]
pub struct YtDlpRunner {
    bin: String,
}

impl YtDlpRunner {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Runner for the binary configured through `YTDL_BIN`
    pub fn from_config() -> Self {
        Self::new(config::YTDL_BIN.as_str())
    }
}

#[async_trait]
impl ProcessRunner for YtDlpRunner {
    async fn launch(&self, request: &DownloadRequest) -> Result<RunningDownload, DownloadError> {
        let args = build_ytdlp_args(request);
        log::debug!("yt-dlp command: {} {}", self.bin, args.join(" "));

        let mut cmd = Command::new(&self.bin);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // yt-dlp leads its own group so ffmpeg and other helpers die with it
        #[cfg(unix)]
        {
            cmd.process_group(0);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| DownloadError::Process(format!("Failed to spawn {}: {}", self.bin, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::Process("yt-dlp stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::Process("yt-dlp stderr was not captured".to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let (kill, kill_rx) = oneshot::channel();
        let output_path = request.output_path.clone();

        let exit = tokio::spawn(async move {
            let follow = async {
                let (stdout_tail, stderr_tail) = tokio::join!(
                    forward_lines(stdout, tx, STDOUT_TAIL_LINES),
                    collect_tail(stderr, config::download::STDERR_TAIL_LINES),
                );

                match child.wait().await {
                    Ok(status) => {
                        let diagnostics = join_tails(&stdout_tail, &stderr_tail);
                        classify_exit(status.success(), status.code(), &output_path, &diagnostics)
                    }
                    Err(e) => Err(DownloadError::Process(format!("Failed to wait for yt-dlp: {}", e))),
                }
            };

            tokio::select! {
                result = follow => result,
                _ = kill_rx => {
                    kill_process_tree(&mut child).await;
                    Err(DownloadError::Timeout("yt-dlp was killed before it finished".to_string()))
                }
            }
        });

        Ok(RunningDownload { lines: rx, exit, kill })
    }
}

/// Kills yt-dlp's process group, then the leader itself, and reaps it.
async fn kill_process_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            signal_process_group(pid);
        }
    }
    if let Err(e) = child.kill().await {
        log::warn!("Failed to kill yt-dlp: {}", e);
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn signal_process_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: killpg only sends a signal; the group was created by process_group(0) at spawn
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        log::warn!(
            "Failed to kill process group {}: {}",
            pgid,
            std::io::Error::last_os_error()
        );
    }
}

/// Reads one `\n`-terminated line, decoding invalid UTF-8 lossily.
/// Returns `Ok(None)` at end of stream.
async fn read_line_lossy<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Sends every line to `tx` and returns the last `keep` lines.
/// A dropped receiver doesn't stop the read, the pipe still has to be drained.
async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>, keep: usize) -> VecDeque<String>
where
    R: AsyncRead + Unpin,
{
    let mut tail = VecDeque::with_capacity(keep);
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        match read_line_lossy(&mut reader, &mut buf).await {
            Ok(Some(line)) => {
                push_bounded(&mut tail, line.clone(), keep);
                let _ = tx.send(line);
            }
            Ok(None) => break,
            Err(e) => {
                log::warn!("Failed to read yt-dlp stdout: {}", e);
                break;
            }
        }
    }
    tail
}

async fn collect_tail<R>(reader: R, keep: usize) -> VecDeque<String>
where
    R: AsyncRead + Unpin,
{
    let mut tail = VecDeque::with_capacity(keep);
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        match read_line_lossy(&mut reader, &mut buf).await {
            Ok(Some(line)) => {
                log::debug!("yt-dlp stderr: {}", line);
                push_bounded(&mut tail, line, keep);
            }
            Ok(None) => break,
            Err(e) => {
                log::warn!("Failed to read yt-dlp stderr: {}", e);
                break;
            }
        }
    }
    tail
}

fn push_bounded(tail: &mut VecDeque<String>, line: String, keep: usize) {
    if keep == 0 {
        return;
    }
    if tail.len() == keep {
        tail.pop_front();
    }
    tail.push_back(line);
}

fn join_tails(stdout_tail: &VecDeque<String>, stderr_tail: &VecDeque<String>) -> String {
    stdout_tail
        .iter()
        .chain(stderr_tail.iter())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turns the process exit into the runner's result.
///
/// A clean exit without the output file is a failure too: that is how
/// yt-dlp reports a download skipped by `--max-filesize`.
pub fn classify_exit(
    success: bool,
    code: Option<i32>,
    output_path: &Path,
    diagnostics: &str,
) -> Result<(), DownloadError> {
    if !success {
        let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
        return Err(DownloadError::YtDlp(format!(
            "yt-dlp exited with {}: {}",
            code,
            diagnostics.trim()
        )));
    }

    if !output_path.exists() {
        return Err(DownloadError::FileNotFound(format!(
            "yt-dlp finished but {} is missing: {}",
            output_path.display(),
            diagnostics.trim()
        )));
    }

    Ok(())
}

/// Returns the installed yt-dlp version
pub async fn ytdlp_version() -> Result<String, AppError> {
    let ytdl_bin = config::YTDL_BIN.as_str();
    let mut cmd = Command::new(ytdl_bin);
    cmd.arg("--version");

    let output = run_with_timeout(&mut cmd, config::process::ytdlp_query_timeout()).await?;
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();

    if version.is_empty() {
        return Err(AppError::Download(DownloadError::Process(
            "yt-dlp is not installed or --version produced no output".to_string(),
        )));
    }

    Ok(version)
}

/// Prints the yt-dlp version (CLI `check-ytdlp`)
pub async fn print_ytdlp_version() -> Result<(), AppError> {
    log::info!("Checking yt-dlp version...");
    let version = ytdlp_version().await?;
    println!("yt-dlp version: {}", version);
    log::info!("yt-dlp version: {}", version);
    Ok(())
}
