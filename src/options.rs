//! Controller behavior options
//!
//! The two historical variants of this application differed in whether
//! they probed connectivity before a download and whether synchronous
//! launch failures were surfaced in the status line. Both behaviors are
//! explicit switches here instead of divergent code paths. Nothing is
//! persisted between sessions.

/// Behavior switches for the download controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Probe a known external host before starting a download
    pub preflight_probe: bool,
    /// Render launch failures in the status line instead of only logging them
    pub recover_launch_errors: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            preflight_probe: true,
            recover_launch_errors: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_options_default_on() {
        let options = ControllerOptions::default();
        assert!(options.preflight_probe);
        assert!(options.recover_launch_errors);
    }
}
