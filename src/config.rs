//! Configuration constants for the tubefetch video downloader
//!
//! This module contains application-wide configuration values including
//! UI settings, the connectivity probe, and extraction-tool locations.

/// The current application version (keep in sync with Cargo.toml)
pub const APP_VERSION: &str = "0.1.0";

/// Default window size
pub static WINDOW_SIZE: [f32; 2] = [960.0, 540.0];

/// Minimum window size
pub static MIN_WINDOW_SIZE: [f32; 2] = [640.0, 420.0];

/// Host probed before starting a download to detect an offline machine
pub static CONNECTIVITY_PROBE_URL: &str = "http://www.google.com";

/// Upper bound for the connectivity probe
pub static CONNECTIVITY_PROBE_TIMEOUT_SECS: u64 = 5;

/// Container extension suggested by the save dialog
pub static SAVE_DIALOG_EXTENSION: &str = "mp4";

/// Name of the external extraction tool the fetch worker drives
pub static TOOL_BINARY: &str = "yt-dlp";

/// Official release binary (Windows)
pub static TOOL_DOWNLOAD_URL_WINDOWS: &str =
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp.exe";

/// Official release binary (macOS)
pub static TOOL_DOWNLOAD_URL_MACOS: &str =
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp_macos";

/// Official release binary (Linux)
pub static TOOL_DOWNLOAD_URL_LINUX: &str =
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp_linux";

/// Time limit for fetching the tool binary
pub static TOOL_DOWNLOAD_TIMEOUT_SECS: u64 = 180;

/// Progress messages buffered between the worker and the UI thread
pub static PROGRESS_CHANNEL_CAPACITY: usize = 64;

/// Release binary matching the running platform
pub fn tool_download_url() -> &'static str {
    if cfg!(windows) {
        TOOL_DOWNLOAD_URL_WINDOWS
    } else if cfg!(target_os = "macos") {
        TOOL_DOWNLOAD_URL_MACOS
    } else {
        TOOL_DOWNLOAD_URL_LINUX
    }
}
