//! Error types for the directory feed

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for watcher operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors that can occur while setting up a feed
#[derive(Error, Debug)]
pub enum WatchError {
    /// Directory not found
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Notify backend error
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
