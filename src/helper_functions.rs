//! Common utility functions and validation helpers
//!
//! This module provides utility functions for path handling, string
//! formatting, the pre-flight connectivity probe, and the input validation
//! used by the download controller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{
    CONNECTIVITY_PROBE_TIMEOUT_SECS, CONNECTIVITY_PROBE_URL, SAVE_DIALOG_EXTENSION,
};

/// Common utility functions used throughout the application
pub struct Utils;

impl Utils {
    /// Split a destination path into the directory and file name the
    /// extraction tool expects as separate arguments
    pub fn split_destination(path: &Path) -> (PathBuf, String) {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("video.mp4")
            .to_string();
        (dir, file_name)
    }

    /// File name suggested by the save dialog for the entered video name
    pub fn suggested_file_name(filename: &str) -> String {
        format!("{}.{}", filename.trim(), SAVE_DIALOG_EXTENSION)
    }

    /// Time-bounded reachability check against a known external host.
    /// Blocking; only ever called from the download thread.
    pub fn connection_available() -> bool {
        let client = match reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(CONNECTIVITY_PROBE_TIMEOUT_SECS))
            .build()
        {
            Ok(client) => client,
            Err(_) => return false,
        };
        client.get(CONNECTIVITY_PROBE_URL).send().is_ok()
    }
}

/// Input validation utilities
pub struct Validation;

impl Validation {
    /// The link field must contain something besides whitespace
    pub fn has_link(link: &str) -> bool {
        !link.trim().is_empty()
    }

    /// The filename field must contain something besides whitespace
    pub fn has_filename(filename: &str) -> bool {
        !filename.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_destination_separates_dir_and_file() {
        let (dir, name) = Utils::split_destination(Path::new("/tmp/videos/clip.mp4"));
        assert_eq!(dir, PathBuf::from("/tmp/videos"));
        assert_eq!(name, "clip.mp4");
    }

    #[test]
    fn split_destination_bare_file_name_uses_current_dir() {
        let (dir, name) = Utils::split_destination(Path::new("clip.mp4"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "clip.mp4");
    }

    #[test]
    fn suggested_file_name_appends_extension() {
        assert_eq!(Utils::suggested_file_name("clip"), "clip.mp4");
        assert_eq!(Utils::suggested_file_name("  clip  "), "clip.mp4");
    }

    #[test]
    fn link_and_filename_validation_reject_blank_input() {
        assert!(!Validation::has_link(""));
        assert!(!Validation::has_link("   "));
        assert!(Validation::has_link("https://youtu.be/abc"));
        assert!(!Validation::has_filename(""));
        assert!(Validation::has_filename("clip"));
    }
}
