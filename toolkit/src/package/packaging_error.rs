//! Error types for container packaging operations.
//!
//! Covers I/O failures while streaming the workspace into a `.wcp`
//! container and failures moving the finished container into place.

use std::path::PathBuf;
use thiserror::Error;

/// Errors arising from container packaging.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// An I/O operation failed (reading workspace files, writing the archive).
    #[error("I/O error during packaging: {0}")]
    Io(#[from] std::io::Error),

    /// The directory to package does not exist or is not a directory.
    #[error("packaging root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The finished container could not be moved to its final path.
    #[error("failed to move container into place at {}: {source}", path.display())]
    Persist {
        /// Final container path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
