//! Identifier store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or persisting the processed-ID file.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The file exists but could not be read or parsed. The processed state is
    /// unknown and must not be treated as empty.
    #[error("Processed IDs file '{path}' is corrupted: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    /// Creating the parent directory failed.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the file failed.
    #[error("Failed to write '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The startup write probe failed.
    #[error("Storage directory '{path}' is not writable: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
