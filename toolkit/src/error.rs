//! Error types for a single archive conversion.
//!
//! Every failure is local to one archive. Stage errors from extraction,
//! manifest emission, and packaging are wrapped with their cause so the
//! batch layer can report them and carry on with the next file.

use crate::format::ArchiveFormat;
use crate::package::extraction::ExtractionError;
use crate::package::manifest::ManifestError;
use crate::package::packaging_error::PackagingError;
use std::path::PathBuf;
use thiserror::Error;

/// Why a conversion request was rejected before any work began.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidInputReason {
    /// The file name lacks the converter's extension.
    #[error("expected a {} archive", expected.extension())]
    WrongExtension {
        /// Format the converter accepts.
        expected: ArchiveFormat,
    },

    /// The archive does not exist or is not a regular file.
    #[error("file not found")]
    NotFound,

    /// A development build was submitted without a version.
    #[error("development builds need an explicit version name and code")]
    MissingVersion,
}

/// Errors that can occur while converting one archive.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The request was rejected up front.
    #[error("invalid input {}: {reason}", path.display())]
    InvalidInput {
        /// Archive named by the request.
        path: PathBuf,
        /// What was wrong with it.
        reason: InvalidInputReason,
    },

    /// The temporary workspace could not be created.
    #[error("failed to create workspace in {}: {source}", path.display())]
    Workspace {
        /// Directory the workspace was to be created in.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The source archive could not be unpacked.
    #[error("failed to extract {}: {source}", archive.display())]
    Extraction {
        /// Archive being extracted.
        archive: PathBuf,
        /// The extraction failure.
        #[source]
        source: ExtractionError,
    },

    /// Renaming architecture folders failed.
    #[error("failed to normalise architecture folders: {source}")]
    Normalization {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// `profile.json` could not be written.
    #[error("failed to write manifest: {0}")]
    Manifest(#[from] ManifestError),

    /// The output container could not be produced.
    #[error("failed to package container: {0}")]
    Packaging(#[from] PackagingError),
}

impl ConversionError {
    pub(crate) fn invalid_input(path: impl Into<PathBuf>, reason: InvalidInputReason) -> Self {
        Self::InvalidInput {
            path: path.into(),
            reason,
        }
    }
}

/// Result type alias using [`ConversionError`].
pub type Result<T> = std::result::Result<T, ConversionError>;
