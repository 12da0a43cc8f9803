//! Error types for the Javonet installer tools.
//!
//! This module defines the run-level error variants that abort a whole
//! invocation. Per-item failures (a single download, a single archive) are
//! reported by the flows and never surface here.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::lockfile::VersionError;

/// Errors that abort a download or extraction run.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The SDK package directory does not exist.
    #[error("Javonet package directory not found: {path}")]
    PackageDirNotFound {
        /// Path that was expected to be a directory.
        path: Utf8PathBuf,
    },

    /// The SDK version could not be detected from the lock file.
    #[error("could not detect package version: {0}")]
    Version(#[from] VersionError),

    /// None of the component archives could be extracted.
    #[error("no components extracted ({total} expected)")]
    NoArchivesExtracted {
        /// Number of archives the run tried to extract.
        total: usize,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write console output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
