//! Data structures and types for the tubefetch video downloader
//!
//! This module contains the core data structures including the download
//! request, worker messages, and the application state shared between the
//! controller logic and the GUI.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Type alias for the extraction-tool install result published by the
/// installer thread and polled by the UI thread
pub type InstallResult = Arc<Mutex<Option<Result<PathBuf, String>>>>;

/// Quality tier selected in the form, mapped to a stream-selection policy
/// rather than a literal resolution value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quality {
    Low,
    Medium,
    High,
}

/// Inputs for one download, immutable once handed to the worker thread
#[derive(Clone, Debug)]
pub struct DownloadRequest {
    pub link: String,
    pub destination: PathBuf,
    pub quality: Quality,
}

/// Controller state machine: at most one download is in flight at a time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Downloading,
}

/// Messages sent from the background thread to the UI thread
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorkerMessage {
    /// The pre-flight reachability check failed; no fetch was attempted
    Unreachable,
    /// Percentage in [0, 100], or the negative failure sentinel
    Progress(f64),
}

/// Main application state for the video downloader
pub struct VideoDownloader {
    // Form state
    pub link_input: String,
    pub filename_input: String,
    pub quality: Option<Quality>,

    // Controller state
    pub options: crate::options::ControllerOptions,
    pub phase: Phase,
    pub status: String,
    pub progress: u32,
    pub worker_handle: Option<JoinHandle<()>>,
    pub progress_receiver: Option<Receiver<WorkerMessage>>,

    // Extraction-tool state
    pub tool_path: Option<PathBuf>,
    pub tool_version: Option<String>,
    pub installing_tool: bool,
    pub tool_install_result: InstallResult,
}
