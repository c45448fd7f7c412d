//! Events delivered by a directory feed

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A settled file system change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// File content or write time changed
    Changed {
        path: PathBuf,
        /// Modification time read once the burst settled
        modified: SystemTime,
    },
    /// File moved within the watched directory
    Renamed { from: PathBuf, to: PathBuf },
    /// File removed
    Deleted { path: PathBuf },
    /// Backend failure (message plus any source chain)
    Error { message: String, trace: String },
}

impl WatchEvent {
    /// Build an error event from anything implementing `std::error::Error`
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut trace = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push(cause.to_string());
            source = cause.source();
        }
        Self::Error {
            message: err.to_string(),
            trace: trace.join("\n"),
        }
    }

    /// Primary path the event concerns (the old path for renames)
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Changed { path, .. } | Self::Deleted { path } => Some(path),
            Self::Renamed { from, .. } => Some(from),
            Self::Error { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_event_collects_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "queue overflow");
        let outer = crate::WatchError::Io(inner);
        match WatchEvent::from_error(&outer) {
            WatchEvent::Error { message, .. } => assert!(message.contains("queue overflow")),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_path_of_rename_is_old_path() {
        let event = WatchEvent::Renamed {
            from: PathBuf::from("/w/a"),
            to: PathBuf::from("/w/b"),
        };
        assert_eq!(event.path(), Some(Path::new("/w/a")));
    }
}
