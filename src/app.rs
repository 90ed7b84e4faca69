//! Application logic for the tubefetch video downloader
//!
//! This module contains the download controller: input validation, the
//! single-flight state machine, the per-frame channel drain, and the
//! extraction-tool install flow. Rendering lives in the gui module.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::data_structures::{DownloadRequest, Phase, Quality, VideoDownloader, WorkerMessage};
use crate::download_worker;
use crate::helper_functions::Validation;
use crate::options::ControllerOptions;
use crate::tool_manager::ToolManager;

// Use the logging macros directly from the crate root
use crate::{error, info, warn};

impl Default for VideoDownloader {
    fn default() -> Self {
        info!("Initializing VideoDownloader");
        let tool_path = ToolManager::resolve();
        let tool_version = ToolManager::get_version();
        info!(
            "Extraction tool: {:?}, version: {:?}",
            tool_path, tool_version
        );

        Self {
            link_input: String::new(),
            filename_input: String::new(),
            quality: Some(Quality::Medium),
            options: ControllerOptions::default(),
            phase: Phase::Idle,
            status: if tool_path.is_some() {
                "Paste a link and pick a quality to get started.".to_string()
            } else {
                "yt-dlp not found. Install it to enable downloads.".to_string()
            },
            progress: 0,
            worker_handle: None,
            progress_receiver: None,
            tool_path,
            tool_version,
            installing_tool: false,
            tool_install_result: Arc::new(Mutex::new(None)),
        }
    }
}

impl VideoDownloader {
    /// Controller with non-default behavior switches
    pub fn with_options(options: ControllerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Field checks for the download form. The first failing check wins,
    /// sets the status line, and nothing is started.
    pub fn validate_inputs(&mut self) -> Option<(String, String, Quality)> {
        if !Validation::has_link(&self.link_input) {
            self.status = "Please enter a valid YouTube link.".to_string();
            return None;
        }
        if !Validation::has_filename(&self.filename_input) {
            self.status = "Please enter a filename.".to_string();
            return None;
        }
        let Some(quality) = self.quality else {
            self.status = "Please select a quality.".to_string();
            return None;
        };
        Some((
            self.link_input.trim().to_string(),
            self.filename_input.trim().to_string(),
            quality,
        ))
    }

    /// Outcome of the save dialog: cancel stops, a chosen path launches
    pub fn handle_save_choice(
        &mut self,
        link: String,
        quality: Quality,
        save_path: Option<PathBuf>,
    ) {
        match save_path {
            None => {
                info!("Save dialog canceled");
                self.status = "Download canceled.".to_string();
            }
            Some(destination) => self.launch_download(DownloadRequest {
                link,
                destination,
                quality,
            }),
        }
    }

    /// Start the background thread for a validated request. A no-op while
    /// a download is already in flight; in-flight downloads are exclusive.
    pub fn launch_download(&mut self, request: DownloadRequest) {
        if self.phase == Phase::Downloading {
            return;
        }

        info!(
            "Starting download: {} -> {} ({:?})",
            request.link,
            request.destination.display(),
            request.quality
        );

        match download_worker::spawn(request, self.options) {
            Ok((handle, receiver)) => {
                self.phase = Phase::Downloading;
                self.status = "Download Starting...".to_string();
                self.progress = 0;
                self.worker_handle = Some(handle);
                self.progress_receiver = Some(receiver);
            }
            Err(e) => {
                error!("Failed to spawn download thread: {}", e);
                if self.options.recover_launch_errors {
                    self.status = format!("An error occurred: {}", e);
                }
            }
        }
    }

    /// Drain the progress channel and apply every message in order, so the
    /// last delivered value wins for the rendered percentage
    pub fn poll_worker(&mut self) {
        let mut drained = Vec::new();
        if let Some(receiver) = &self.progress_receiver {
            while let Ok(message) = receiver.try_recv() {
                drained.push(message);
            }
        }
        for message in drained {
            self.apply_message(message);
        }
    }

    /// Rendering rule for one worker message
    pub fn apply_message(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Unreachable => {
                warn!("Connectivity probe failed; download not started");
                self.status = "Connection Problem.".to_string();
                self.finish_download();
            }
            WorkerMessage::Progress(value) if value < 0.0 => {
                self.status = "An error occurred during download.".to_string();
                self.finish_download();
            }
            WorkerMessage::Progress(value) if value < 100.0 => {
                let floored = value.floor() as u32;
                self.status = format!("Downloading {}%", floored);
                self.progress = floored;
            }
            WorkerMessage::Progress(_) => {
                self.status = "Downloaded.".to_string();
                self.progress = 100;
                self.finish_download();
            }
        }
    }

    /// Terminal transition back to Idle; reaps the worker thread. The
    /// start action is usable again after every terminal message, whether
    /// the download succeeded or failed.
    fn finish_download(&mut self) {
        self.phase = Phase::Idle;
        self.progress_receiver = None;
        if let Some(handle) = self.worker_handle.take() {
            // The worker sent its terminal message, so it is exiting
            let _ = handle.join();
        }
    }

    /// Download the extraction tool in the background
    pub fn start_tool_install(&mut self) {
        if self.installing_tool {
            return;
        }
        info!("User initiated extraction tool install");
        self.installing_tool = true;
        self.status = "Downloading yt-dlp...".to_string();

        let result_ptr = Arc::clone(&self.tool_install_result);
        std::thread::spawn(move || {
            let result = ToolManager::install_tool();
            *result_ptr.lock().unwrap() = Some(result);
        });
    }

    /// Poll the installer thread result; called every frame
    pub fn handle_installation_state(&mut self) {
        if !self.installing_tool {
            return;
        }
        let result = self
            .tool_install_result
            .lock()
            .ok()
            .and_then(|mut guard| guard.take());
        if let Some(result) = result {
            self.installing_tool = false;
            match result {
                Ok(path) => {
                    info!("Extraction tool installed at {}", path.display());
                    self.tool_path = Some(path);
                    self.tool_version = ToolManager::get_version();
                    self.status = "yt-dlp installed.".to_string();
                }
                Err(e) => {
                    error!("Extraction tool install failed: {}", e);
                    self.status = format!("yt-dlp install failed: {}", e);
                }
            }
        }
    }

    // Getters for GUI access
    pub fn is_downloading(&self) -> bool {
        self.phase == Phase::Downloading
    }
    pub fn get_status(&self) -> &str {
        &self.status
    }
    pub fn get_progress(&self) -> u32 {
        self.progress
    }
    pub fn is_tool_available(&self) -> bool {
        self.tool_path.is_some()
    }
    pub fn get_tool_version(&self) -> Option<&String> {
        self.tool_version.as_ref()
    }
    pub fn is_installing_tool(&self) -> bool {
        self.installing_tool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download_worker::{PROGRESS_DONE, PROGRESS_FAILED};

    fn downloader() -> VideoDownloader {
        let mut app = VideoDownloader::default();
        app.link_input = "https://youtu.be/abc".to_string();
        app.filename_input = "clip".to_string();
        app.quality = Some(Quality::High);
        app
    }

    #[test]
    fn empty_link_fails_first() {
        let mut app = downloader();
        app.link_input.clear();
        assert!(app.validate_inputs().is_none());
        assert_eq!(app.get_status(), "Please enter a valid YouTube link.");
        assert!(app.worker_handle.is_none());
    }

    #[test]
    fn empty_filename_fails_second() {
        let mut app = downloader();
        app.filename_input = "   ".to_string();
        assert!(app.validate_inputs().is_none());
        assert_eq!(app.get_status(), "Please enter a filename.");
        assert!(app.worker_handle.is_none());
    }

    #[test]
    fn missing_quality_fails_third() {
        let mut app = downloader();
        app.quality = None;
        assert!(app.validate_inputs().is_none());
        assert_eq!(app.get_status(), "Please select a quality.");
        assert!(app.worker_handle.is_none());
    }

    #[test]
    fn valid_inputs_pass_trimmed() {
        let mut app = downloader();
        app.link_input = "  https://youtu.be/abc  ".to_string();
        let (link, filename, quality) = app.validate_inputs().unwrap();
        assert_eq!(link, "https://youtu.be/abc");
        assert_eq!(filename, "clip");
        assert_eq!(quality, Quality::High);
    }

    #[test]
    fn canceled_save_dialog_starts_nothing() {
        let mut app = downloader();
        app.handle_save_choice("https://youtu.be/abc".to_string(), Quality::High, None);
        assert_eq!(app.get_status(), "Download canceled.");
        assert_eq!(app.phase, Phase::Idle);
        assert!(app.worker_handle.is_none());
    }

    #[test]
    fn second_launch_while_downloading_is_a_no_op() {
        let mut app = downloader();
        app.phase = Phase::Downloading;
        app.status = "Downloading 40%".to_string();
        app.launch_download(DownloadRequest {
            link: "https://youtu.be/abc".to_string(),
            destination: PathBuf::from("/tmp/clip.mp4"),
            quality: Quality::High,
        });
        // Nothing changed and no second worker exists
        assert_eq!(app.get_status(), "Downloading 40%");
        assert!(app.worker_handle.is_none());
        assert_eq!(app.phase, Phase::Downloading);
    }

    #[test]
    fn progress_messages_render_floored_percentages() {
        let mut app = downloader();
        app.phase = Phase::Downloading;
        app.apply_message(WorkerMessage::Progress(42.9));
        assert_eq!(app.get_status(), "Downloading 42%");
        assert_eq!(app.get_progress(), 42);
        assert!(app.is_downloading());
    }

    #[test]
    fn completion_re_enables_the_start_action() {
        let mut app = downloader();
        app.phase = Phase::Downloading;
        app.apply_message(WorkerMessage::Progress(PROGRESS_DONE));
        assert_eq!(app.get_status(), "Downloaded.");
        assert_eq!(app.get_progress(), 100);
        assert_eq!(app.phase, Phase::Idle);
    }

    #[test]
    fn failure_sentinel_re_enables_the_start_action() {
        let mut app = downloader();
        app.phase = Phase::Downloading;
        app.progress = 40;
        app.apply_message(WorkerMessage::Progress(PROGRESS_FAILED));
        assert_eq!(app.get_status(), "An error occurred during download.");
        assert_eq!(app.phase, Phase::Idle);
        // The indicator keeps its last value; only the status reports failure
        assert_eq!(app.get_progress(), 40);
    }

    #[test]
    fn probe_failure_renders_connection_problem() {
        let mut app = downloader();
        app.phase = Phase::Downloading;
        app.apply_message(WorkerMessage::Unreachable);
        assert_eq!(app.get_status(), "Connection Problem.");
        assert_eq!(app.phase, Phase::Idle);
    }

    #[test]
    fn drained_messages_apply_in_order_last_wins() {
        let mut app = downloader();
        app.phase = Phase::Downloading;
        for value in [10.0, 55.5, 99.9] {
            app.apply_message(WorkerMessage::Progress(value));
        }
        assert_eq!(app.get_status(), "Downloading 99%");
        assert_eq!(app.get_progress(), 99);
        app.apply_message(WorkerMessage::Progress(PROGRESS_DONE));
        assert_eq!(app.get_progress(), 100);
    }
}
