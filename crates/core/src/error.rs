//! Error types for backup retention

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for backup operations
pub type Result<T> = std::result::Result<T, BackupError>;

/// Errors raised by the retention controller and its collaborators
#[derive(Error, Debug)]
pub enum BackupError {
    /// `start` called while a session is active
    #[error("cannot start watching a new file; already watching {0}")]
    AlreadyWatching(PathBuf),

    /// The file to watch does not exist (or is not a regular file)
    #[error("invalid file path {0}: the file must exist to be watched")]
    InvalidPath(PathBuf),

    /// Capacity or interval out of range
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// Operation requires an active session
    #[error("not watching any file")]
    NotWatching,

    /// Failure reported by the file-system notification feed
    #[error("watch subsystem error: {0}")]
    WatchSubsystem(String),

    /// Copy/delete/rename failure
    #[error("failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Discriminant of [`BackupError`], convenient for matching in callers and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyWatching,
    InvalidPath,
    InvalidPolicy,
    NotWatching,
    WatchSubsystem,
    Io,
}

impl BackupError {
    /// Wrap an I/O error with the operation and path it concerned
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyWatching(_) => ErrorKind::AlreadyWatching,
            Self::InvalidPath(_) => ErrorKind::InvalidPath,
            Self::InvalidPolicy(_) => ErrorKind::InvalidPolicy,
            Self::NotWatching => ErrorKind::NotWatching,
            Self::WatchSubsystem(_) => ErrorKind::WatchSubsystem,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}
