//! Watched file identity and backup records

use crate::naming::{parse_backup_name, split_name, timestamped_path};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// The file currently under observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedFile {
    /// Absolute path
    pub path: PathBuf,
    /// Containing directory
    pub dir: PathBuf,
    /// File name (stem + extension)
    pub name: String,
    /// File name without its extension
    pub stem: String,
    /// Extension including the dot, or empty
    pub extension: String,
    /// Last known modification time
    pub modified: DateTime<Local>,
}

impl WatchedFile {
    /// Build the identity for an absolute path
    ///
    /// Returns `None` for paths without a parent or a file name (e.g. `/`).
    pub fn new(path: impl Into<PathBuf>, modified: DateTime<Local>) -> Option<Self> {
        let path = path.into();
        let dir = path.parent()?.to_path_buf();
        let name = path.file_name()?.to_string_lossy().into_owned();
        let (stem, extension) = split_name(&name);

        Some(Self {
            path,
            dir,
            name,
            stem,
            extension,
            modified,
        })
    }

    /// Same file moved to `new_path`, keeping the last known modification time
    pub fn renamed(&self, new_path: impl Into<PathBuf>) -> Option<Self> {
        Self::new(new_path, self.modified)
    }

    /// Whether an event path refers to this file
    pub fn is(&self, path: &Path) -> bool {
        self.path == path
    }

    /// Path of a backup of this file taken at `timestamp`
    pub fn backup_path(&self, timestamp: &DateTime<Local>) -> PathBuf {
        timestamped_path(&self.dir, &self.stem, &self.extension, timestamp)
    }
}

/// One retained backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// Location of the backup copy
    pub path: PathBuf,
    /// Source modification time when the backup was taken
    pub timestamp: DateTime<Local>,
}

impl BackupRecord {
    /// Create a new record
    pub fn new(path: impl Into<PathBuf>, timestamp: DateTime<Local>) -> Self {
        Self {
            path: path.into(),
            timestamp,
        }
    }

    /// File name of the backup, for log lines
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension of the backup file including the dot, or empty
    pub fn extension(&self) -> String {
        match parse_backup_name(&self.path) {
            Some(name) => name.extension,
            None => split_name(&self.file_name()).1,
        }
    }

    /// Where this backup lives once the watched file's stem becomes `new_stem`
    ///
    /// The record keeps its own timestamp suffix and extension.
    pub fn relocated(&self, new_stem: &str) -> PathBuf {
        let dir = self.path.parent().unwrap_or_else(|| Path::new(""));
        timestamped_path(dir, new_stem, &self.extension(), &self.timestamp)
    }
}
