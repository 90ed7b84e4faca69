//! Extraction-tool discovery and installation
//!
//! This module locates the external video-extraction tool the fetch worker
//! drives, reports its version for the UI, and can download a managed copy
//! of the official release binary when the system has none.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Mutex;
use std::time::Duration;

use log::{info, warn};
use once_cell::sync::Lazy;

use crate::config::{tool_download_url, TOOL_BINARY, TOOL_DOWNLOAD_TIMEOUT_SECS};
use crate::debug;

// Resolved tool path, cached across lookups. Installation replaces it.
static RESOLVED_TOOL: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

/// Extraction-tool discovery and installation utilities
pub struct ToolManager;

impl ToolManager {
    /// Locate the extraction tool, preferring a cached resolution
    pub fn resolve() -> Option<PathBuf> {
        if let Ok(cache) = RESOLVED_TOOL.lock() {
            if let Some(path) = cache.as_ref() {
                if path.exists() {
                    return Some(path.clone());
                }
            }
        }
        let located = Self::locate();
        if let Some(path) = &located {
            if let Ok(mut cache) = RESOLVED_TOOL.lock() {
                *cache = Some(path.clone());
            }
        }
        located
    }

    /// Managed copy first, then PATH
    fn locate() -> Option<PathBuf> {
        let managed = Self::managed_tool_path();
        if managed.exists() {
            debug!("Using managed extraction tool at {}", managed.display());
            return Some(managed);
        }
        match which::which(TOOL_BINARY) {
            Ok(path) => {
                debug!("Found {} on PATH at {}", TOOL_BINARY, path.display());
                Some(path)
            }
            Err(_) => {
                debug!("{} not found on PATH", TOOL_BINARY);
                None
            }
        }
    }

    /// Record a freshly installed binary so later resolutions skip the lookup
    pub fn note_installed(path: &Path) {
        if let Ok(mut cache) = RESOLVED_TOOL.lock() {
            *cache = Some(path.to_path_buf());
        }
    }

    /// Directory holding the managed copy of the tool
    pub fn managed_dir() -> PathBuf {
        #[cfg(windows)]
        {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|dir| dir.join("bin")))
                .unwrap_or_else(|| std::env::temp_dir().join("tubefetch").join("bin"))
        }

        #[cfg(target_os = "macos")]
        {
            dirs::home_dir()
                .map(|home| home.join("Library/Application Support/tubefetch/bin"))
                .unwrap_or_else(|| std::env::temp_dir().join("tubefetch").join("bin"))
        }

        #[cfg(all(not(windows), not(target_os = "macos")))]
        {
            if let Ok(xdg_dirs) = xdg::BaseDirectories::new() {
                xdg_dirs.get_data_home().join("tubefetch").join("bin")
            } else if let Some(home) = dirs::home_dir() {
                home.join(".tubefetch").join("bin")
            } else {
                std::env::temp_dir().join("tubefetch").join("bin")
            }
        }
    }

    /// Platform file name of the tool binary
    pub fn binary_name() -> String {
        if cfg!(windows) {
            format!("{}.exe", TOOL_BINARY)
        } else {
            TOOL_BINARY.to_string()
        }
    }

    /// Full path of the managed copy
    pub fn managed_tool_path() -> PathBuf {
        Self::managed_dir().join(Self::binary_name())
    }

    /// Report the tool version, if any runnable tool is found
    pub fn get_version() -> Option<String> {
        let tool = Self::resolve()?;
        let output = Self::run_command_hidden(&tool, &["--version"]).ok()?;
        if !output.status.success() {
            warn!("{} --version exited with {}", TOOL_BINARY, output.status);
            return None;
        }
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            None
        } else {
            debug!("Extraction tool version: {}", version);
            Some(version)
        }
    }

    /// Download the official per-platform binary into the managed directory
    pub fn install_tool() -> Result<PathBuf, String> {
        let dir = Self::managed_dir();
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
        let target = dir.join(Self::binary_name());
        let url = tool_download_url();
        info!("Downloading {} from {}", TOOL_BINARY, url);

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(TOOL_DOWNLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| e.to_string())?;
        let response = client
            .get(url)
            .header("User-Agent", "tubefetch")
            .send()
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("Download failed: HTTP {}", response.status()));
        }
        let bytes = response.bytes().map_err(|e| e.to_string())?;
        std::fs::write(&target, &bytes)
            .map_err(|e| format!("Failed to write {}: {}", target.display(), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755))
                .map_err(|e| format!("Failed to mark {} executable: {}", target.display(), e))?;
        }

        info!("Installed {} at {}", TOOL_BINARY, target.display());
        Self::note_installed(&target);
        Ok(target)
    }

    /// Run a program to completion without flashing a console window on Windows
    pub fn run_command_hidden(program: &Path, args: &[&str]) -> std::io::Result<Output> {
        let mut cmd = Self::hidden_command(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.output()
    }

    /// Command builder with the same console hiding, for callers that
    /// stream the child's output themselves
    #[cfg(windows)]
    pub fn hidden_command(program: &Path) -> Command {
        use std::os::windows::process::CommandExt;
        let mut cmd = Command::new(program);
        cmd.creation_flags(0x08000000); // CREATE_NO_WINDOW
        cmd
    }

    #[cfg(not(windows))]
    pub fn hidden_command(program: &Path) -> Command {
        Command::new(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_name_matches_platform() {
        let name = ToolManager::binary_name();
        if cfg!(windows) {
            assert_eq!(name, "yt-dlp.exe");
        } else {
            assert_eq!(name, "yt-dlp");
        }
    }

    #[test]
    fn managed_tool_path_ends_with_binary_name() {
        let path = ToolManager::managed_tool_path();
        assert!(path.ends_with(ToolManager::binary_name()));
    }
}
