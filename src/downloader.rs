use std::io::Read;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::{DownloadRequest, LibraryPath, build_external_command, kill_process_tree, tail_chars};

pub(crate) const DOWNLOAD_TIMEOUT_SECS: u64 = 600;
const PROCESS_POLL_MS: u64 = 250;
const DIAGNOSTIC_TAIL_CHARS: usize = 500;
const DOWNLOADER_BIN: &str = "yt-dlp";
const FFMPEG_LOCATION: &str = "/usr/bin";
// Best mp4 video at or below 1080p with m4a audio, then a merged mp4
// fallback, then whatever the host offers.
const FORMAT_PREFERENCE: &str =
    "bestvideo[height<=1080][ext=mp4]+bestaudio[ext=m4a]/best[height<=1080][ext=mp4]/best";

/// Classification of one downloader invocation, consumed exhaustively by
/// the responder and never stored.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum DownloadOutcome {
    Completed {
        file_name: String,
        relative_dir: String,
    },
    ToolFailure(String),
    TimedOut,
    Fault(String),
}

pub(crate) fn download_args(
    source_url: &str,
    target: &LibraryPath,
    cookies: Option<&Path>,
) -> Vec<String> {
    let mut args = vec![
        "-o".to_string(),
        target.output_template(),
        "-f".to_string(),
        FORMAT_PREFERENCE.to_string(),
        "--write-thumbnail".to_string(),
        "--convert-thumbnails".to_string(),
        "jpg".to_string(),
        "--ffmpeg-location".to_string(),
        FFMPEG_LOCATION.to_string(),
        // JavaScript challenge solving on the video host
        "--js-runtimes".to_string(),
        "deno".to_string(),
        "--remote-components".to_string(),
        "ejs:github".to_string(),
        // Never write the jar back; the cookie file may live on read-only storage
        "--no-cookies".to_string(),
        "--retries".to_string(),
        "3".to_string(),
        "--fragment-retries".to_string(),
        "3".to_string(),
        "--ignore-errors".to_string(),
    ];
    if let Some(path) = cookies {
        args.push("--cookies".to_string());
        args.push(path.display().to_string());
    }
    args.push(source_url.to_string());
    args
}

/// Run exactly one downloader invocation, blocking the caller until the
/// process exits or the wall-clock deadline kills it.
pub(crate) fn run_download(
    request: &DownloadRequest,
    target: &LibraryPath,
    cookies: Option<&Path>,
) -> DownloadOutcome {
    let args = download_args(&request.source_url, target, cookies);
    match run_with_deadline(
        DOWNLOADER_BIN,
        &args,
        Duration::from_secs(DOWNLOAD_TIMEOUT_SECS),
    ) {
        Ok(run) => classify(run, target),
        Err(message) => DownloadOutcome::Fault(message),
    }
}

#[derive(Debug)]
struct RunOutput {
    #[allow(dead_code)]
    stdout: String,
    stderr: String,
    /// None when the deadline killed the process.
    status: Option<ExitStatus>,
}

fn classify(run: RunOutput, target: &LibraryPath) -> DownloadOutcome {
    match run.status {
        None => DownloadOutcome::TimedOut,
        Some(status) if status.success() => DownloadOutcome::Completed {
            file_name: format!("{}.mp4", target.stem),
            relative_dir: target.relative_dir.clone(),
        },
        Some(_) => {
            let diagnostic = if run.stderr.is_empty() {
                "unknown error".to_string()
            } else {
                // The most relevant diagnostic is usually last
                tail_chars(&run.stderr, DIAGNOSTIC_TAIL_CHARS).to_string()
            };
            DownloadOutcome::ToolFailure(diagnostic)
        }
    }
}

fn run_with_deadline(
    program: &str,
    args: &[String],
    deadline: Duration,
) -> Result<RunOutput, String> {
    let mut cmd = build_external_command(program, args);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().map_err(|e| format!("{program} spawn: {e}"))?;

    let stdout_handle = child.stdout.take().map(spawn_reader);
    let stderr_handle = child.stderr.take().map(spawn_reader);

    let start = Instant::now();
    let status = loop {
        if start.elapsed() >= deadline {
            kill_process_tree(&mut child);
            break None;
        }
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => thread::sleep(Duration::from_millis(PROCESS_POLL_MS)),
            Err(err) => {
                kill_process_tree(&mut child);
                return Err(format!("{program} wait failed: {err}"));
            }
        }
    };

    let collect = |handle: Option<JoinHandle<Vec<u8>>>| {
        handle
            .and_then(|join| join.join().ok())
            .unwrap_or_default()
    };
    let stdout = String::from_utf8_lossy(&collect(stdout_handle)).into_owned();
    let stderr = String::from_utf8_lossy(&collect(stderr_handle)).into_owned();
    Ok(RunOutput {
        stdout,
        stderr,
        status,
    })
}

fn spawn_reader<R: Read + Send + 'static>(pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut captured = Vec::new();
        let mut buffer = [0u8; 4096];
        let mut reader = pipe;
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => captured.extend_from_slice(&buffer[..n]),
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        captured
    })
}
