//! Open a produced PDF in an external viewer
//!
//! The primary command is tried first; if it cannot be started or exits
//! unsuccessfully the fallback command is tried. Both block until the viewer
//! process exits.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

/// Which viewer, if any, opened the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerOutcome {
    /// The primary command succeeded
    Primary,
    /// The primary command failed and the fallback succeeded
    Fallback,
    /// Neither command succeeded
    Failed,
}

/// Why a single viewer attempt did not succeed
#[derive(Debug)]
enum LaunchError {
    /// The command could not be started (usually not installed)
    Spawn(io::Error),
    /// The command ran and reported failure
    Status(ExitStatus),
}

impl std::fmt::Display for LaunchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchError::Spawn(e) => write!(f, "could not start: {}", e),
            LaunchError::Status(status) => write!(f, "exited with {}", status),
        }
    }
}

fn launch(command: &str, path: &Path) -> Result<(), LaunchError> {
    let status = Command::new(command)
        .arg(path)
        .status()
        .map_err(LaunchError::Spawn)?;
    if status.success() {
        Ok(())
    } else {
        Err(LaunchError::Status(status))
    }
}

/// Open `path` with `primary`, falling back to `fallback`
pub fn open_with_fallback<P: AsRef<Path>>(path: P, primary: &str, fallback: &str) -> ViewerOutcome {
    let path = path.as_ref();

    match launch(primary, path) {
        Ok(()) => {
            log::info!("Opened {} with {}", path.display(), primary);
            return ViewerOutcome::Primary;
        }
        Err(e) => log::warn!("{} failed ({}). Trying {}...", primary, e, fallback),
    }

    match launch(fallback, path) {
        Ok(()) => {
            log::info!("Opened {} with {}", path.display(), fallback);
            ViewerOutcome::Fallback
        }
        Err(LaunchError::Spawn(e)) if e.kind() == io::ErrorKind::NotFound => {
            log::error!(
                "Error: {} not found. Please install {} or {}.",
                fallback,
                fallback,
                primary
            );
            ViewerOutcome::Failed
        }
        Err(e) => {
            log::error!("Error opening PDF with {}: {}", fallback, e);
            ViewerOutcome::Failed
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const MISSING: &str = "sheet2pdf-no-such-viewer";

    #[test]
    fn test_primary_success_skips_fallback() {
        assert_eq!(
            open_with_fallback("out.pdf", "true", MISSING),
            ViewerOutcome::Primary
        );
    }

    #[test]
    fn test_missing_primary_uses_fallback() {
        assert_eq!(
            open_with_fallback("out.pdf", MISSING, "true"),
            ViewerOutcome::Fallback
        );
    }

    #[test]
    fn test_failing_primary_uses_fallback() {
        assert_eq!(
            open_with_fallback("out.pdf", "false", "true"),
            ViewerOutcome::Fallback
        );
    }

    #[test]
    fn test_both_missing() {
        assert_eq!(
            open_with_fallback("out.pdf", MISSING, MISSING),
            ViewerOutcome::Failed
        );
    }

    #[test]
    fn test_fallback_failure_status() {
        assert_eq!(
            open_with_fallback("out.pdf", MISSING, "false"),
            ViewerOutcome::Failed
        );
    }
}
