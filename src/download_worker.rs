//! Background fetch worker
//!
//! One download runs on one dedicated thread: resolve the link into a
//! format list, pick a stream for the requested quality, then drive the
//! extraction tool and republish its byte counters as percentages over a
//! bounded channel. The channel sequence always terminates in either
//! `PROGRESS_DONE` or `PROGRESS_FAILED`; nothing panics across the thread
//! boundary.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::Stdio;
use std::sync::mpsc::{Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use crate::config::PROGRESS_CHANNEL_CAPACITY;
use crate::data_structures::{DownloadRequest, WorkerMessage};
use crate::helper_functions::Utils;
use crate::options::ControllerOptions;
use crate::streams::{select_stream, VideoMetadata};
use crate::tool_manager::ToolManager;
use crate::{debug, error, info, warn};

/// Emitted exactly once when the download finished
pub const PROGRESS_DONE: f64 = 100.0;

/// Negative sentinel meaning the download failed; no values follow it
pub const PROGRESS_FAILED: f64 = -1.0;

// stdout line shape requested from the tool; parsed by parse_progress_line
const PROGRESS_TEMPLATE: &str = "download:%(progress.downloaded_bytes)s/%(progress.total_bytes)s";

/// Failure causes inside the worker. They never cross the channel; each is
/// logged and then collapsed into the failure sentinel.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("extraction tool not found")]
    ToolMissing,
    #[error("failed to run extraction tool: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("could not read video metadata: {0}")]
    Metadata(String),
    #[error("no progressive stream matches the selected quality")]
    NoMatchingStream,
    #[error("download failed: {0}")]
    ToolFailure(String),
}

/// Spawn the probe-then-fetch thread for a validated request.
/// Returns the thread handle and the receiving end of the progress channel.
pub fn spawn(
    request: DownloadRequest,
    options: ControllerOptions,
) -> std::io::Result<(JoinHandle<()>, Receiver<WorkerMessage>)> {
    let (tx, rx) = std::sync::mpsc::sync_channel(PROGRESS_CHANNEL_CAPACITY);
    let handle = thread::Builder::new()
        .name("fetch-worker".to_string())
        .spawn(move || {
            if options.preflight_probe && !Utils::connection_available() {
                warn!("Connectivity probe failed; not starting the download");
                let _ = tx.send(WorkerMessage::Unreachable);
                return;
            }
            match run(&request, &tx) {
                Ok(()) => {
                    info!("Download finished: {}", request.destination.display());
                    let _ = tx.send(WorkerMessage::Progress(PROGRESS_DONE));
                }
                Err(e) => {
                    error!("Download failed for {}: {}", request.link, e);
                    let _ = tx.send(WorkerMessage::Progress(PROGRESS_FAILED));
                }
            }
        })?;
    Ok((handle, rx))
}

/// Resolve, select, download. Progress percentages go out through `tx`.
fn run(request: &DownloadRequest, tx: &SyncSender<WorkerMessage>) -> Result<(), FetchError> {
    let tool = ToolManager::resolve().ok_or(FetchError::ToolMissing)?;
    let metadata = fetch_metadata(&tool, &request.link)?;
    debug!(
        "Resolved \"{}\" with {} formats",
        metadata.title.as_deref().unwrap_or("untitled"),
        metadata.formats.len()
    );
    let stream =
        select_stream(request.quality, &metadata.formats).ok_or(FetchError::NoMatchingStream)?;
    info!(
        "Selected format {} ({}p) for {}",
        stream.format_id,
        stream.height.unwrap_or(0),
        request.link
    );
    download_stream(&tool, &request.link, &stream.format_id, &request.destination, tx)
}

/// Resolve the link into the tool's metadata dump and deserialize it
fn fetch_metadata(tool: &Path, link: &str) -> Result<VideoMetadata, FetchError> {
    debug!("Resolving metadata for {}", link);
    let output =
        ToolManager::run_command_hidden(tool, &["--no-playlist", "--no-warnings", "-J", link])?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FetchError::Metadata(last_line(&stderr)));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    VideoMetadata::parse(&stdout).map_err(|e| FetchError::Metadata(e.to_string()))
}

/// Run the tool for one selected stream and forward its progress
fn download_stream(
    tool: &Path,
    link: &str,
    format_id: &str,
    destination: &Path,
    tx: &SyncSender<WorkerMessage>,
) -> Result<(), FetchError> {
    let (dir, file_name) = Utils::split_destination(destination);
    // The -o value is a literal file name; keep template chars inert
    let file_name = file_name.replace('%', "%%");

    debug!(
        "Downloading format {} into {} as {}",
        format_id,
        dir.display(),
        file_name
    );

    let mut child = ToolManager::hidden_command(tool)
        .args([
            "--no-playlist",
            "--no-warnings",
            "--newline",
            "--progress",
            "--progress-template",
            PROGRESS_TEMPLATE,
            "-f",
            format_id,
            "-P",
        ])
        .arg(&dir)
        .args(["-o", file_name.as_str()])
        .arg(link)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Drain stderr on its own thread so the child never blocks on a full pipe
    let stderr_pipe = child.stderr.take();
    let stderr_reader = thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = stderr_pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    });

    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            if let Some(percentage) = parse_progress_line(&line) {
                let _ = tx.send(WorkerMessage::Progress(percentage));
            }
        }
    }

    let status = child.wait()?;
    let stderr_text = stderr_reader.join().unwrap_or_default();

    if status.success() {
        Ok(())
    } else if stderr_text.trim().is_empty() {
        Err(FetchError::ToolFailure(status.to_string()))
    } else {
        Err(FetchError::ToolFailure(last_line(&stderr_text)))
    }
}

/// Percentage of a transfer with `bytes_remaining` of `total_size` left
pub fn percent_complete(total_size: u64, bytes_remaining: u64) -> f64 {
    if total_size == 0 {
        return 0.0;
    }
    let bytes_downloaded = total_size.saturating_sub(bytes_remaining);
    (bytes_downloaded as f64 / total_size as f64) * 100.0
}

/// Progress lines look like `download:1257819/4816282`. Returns the
/// percentage, or None for unrelated output and unknown totals.
fn parse_progress_line(line: &str) -> Option<f64> {
    let rest = line.trim().strip_prefix("download:")?;
    let (downloaded, total) = rest.split_once('/')?;
    let downloaded: u64 = downloaded.trim().parse().ok()?;
    let total: u64 = total.trim().parse().ok()?;
    if total == 0 {
        return None;
    }
    Some(percent_complete(total, total.saturating_sub(downloaded)))
}

fn last_line(text: &str) -> String {
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("unknown error")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_complete_matches_byte_counters() {
        assert_eq!(percent_complete(1000, 750), 25.0);
        assert_eq!(percent_complete(1000, 0), 100.0);
        assert_eq!(percent_complete(1000, 1000), 0.0);
    }

    #[test]
    fn percent_complete_empty_transfer_is_zero() {
        assert_eq!(percent_complete(0, 0), 0.0);
    }

    #[test]
    fn progress_lines_parse_to_percentages() {
        assert_eq!(parse_progress_line("download:250/1000"), Some(25.0));
        assert_eq!(parse_progress_line("download:1000/1000"), Some(100.0));
        assert_eq!(parse_progress_line("  download:0/400  "), Some(0.0));
    }

    #[test]
    fn unrelated_and_unknown_totals_are_ignored() {
        assert_eq!(parse_progress_line("[download] Destination: clip.mp4"), None);
        assert_eq!(parse_progress_line("download:100/NA"), None);
        assert_eq!(parse_progress_line("download:NA/NA"), None);
        assert_eq!(parse_progress_line("download:100/0"), None);
        assert_eq!(parse_progress_line(""), None);
    }

    #[test]
    fn last_line_skips_blank_tail() {
        assert_eq!(last_line("first\nERROR: no video\n\n"), "ERROR: no video");
        assert_eq!(last_line(""), "unknown error");
    }

    #[cfg(unix)]
    fn fake_tool(dir: &std::path::Path, script_body: &str) -> std::path::PathBuf {
        use std::io::Write as _;
        use std::os::unix::fs::PermissionsExt;

        let tool = dir.join("fake-tool");
        let mut file = std::fs::File::create(&tool).unwrap();
        writeln!(file, "#!/bin/sh").unwrap();
        writeln!(file, "{}", script_body).unwrap();
        drop(file);
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        tool
    }

    #[cfg(unix)]
    #[test]
    fn download_stream_forwards_tool_progress() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            dir.path(),
            "echo 'download:250/1000'\necho 'download:1000/1000'",
        );

        let (tx, rx) = std::sync::mpsc::sync_channel(8);
        let destination = dir.path().join("clip.mp4");
        download_stream(&tool, "https://youtu.be/abc", "18", &destination, &tx).unwrap();
        drop(tx);

        let values: Vec<_> = rx.iter().collect();
        assert_eq!(
            values,
            vec![
                WorkerMessage::Progress(25.0),
                WorkerMessage::Progress(100.0)
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_reports_its_last_stderr_line() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "echo 'ERROR: video unavailable' >&2\nexit 1");

        let (tx, _rx) = std::sync::mpsc::sync_channel(8);
        let destination = dir.path().join("clip.mp4");
        let err = download_stream(&tool, "https://youtu.be/abc", "18", &destination, &tx)
            .unwrap_err();
        assert_eq!(err.to_string(), "download failed: ERROR: video unavailable");
    }

    #[test]
    fn fetch_errors_render_their_cause() {
        let err = FetchError::ToolFailure("ERROR: no video".to_string());
        assert_eq!(err.to_string(), "download failed: ERROR: no video");
        assert_eq!(
            FetchError::NoMatchingStream.to_string(),
            "no progressive stream matches the selected quality"
        );
    }
}
