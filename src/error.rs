use std::path::PathBuf;

use thiserror::Error;

/// Failures the cleaner reports as a distinct kind. Everything else travels as
/// a plain `anyhow::Error` with its cause chain intact.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("Input file not found: {}", .0.display())]
    SourceNotFound(PathBuf),
}
