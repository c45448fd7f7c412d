//! Timestamped backup file naming
//!
//! A backup of `<dir>/<stem><ext>` taken when the source was last modified at
//! `T` lives at `<dir>/<stem>__yyyy-MM-dd_HH-mm-ss<ext>`. Existing backup sets
//! depend on this exact shape.

use chrono::{DateTime, Local, NaiveDateTime};
use std::path::{Path, PathBuf};

/// chrono format string for the embedded suffix (`__yyyy-MM-dd_HH-mm-ss`)
pub const TIMESTAMP_FORMAT: &str = "__%Y-%m-%d_%H-%M-%S";

/// Length of a rendered suffix, e.g. `__2024-01-03_14-30-00`
const SUFFIX_LEN: usize = 21;

/// Split a file name into stem and extension (extension keeps its dot)
///
/// The extension runs from the last `.` to the end of the name and is empty
/// when the name has no dot or ends with one.
/// `notes.txt` -> (`notes`, `.txt`), `archive.tar.gz` -> (`archive.tar`, `.gz`),
/// `Makefile` -> (`Makefile`, ``), `.bashrc` -> (``, `.bashrc`), `file.` -> (`file.`, ``).
pub fn split_name(file_name: &str) -> (String, String) {
    match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() => {
            let (stem, extension) = file_name.split_at(dot);
            (stem.to_string(), extension.to_string())
        }
        _ => (file_name.to_string(), String::new()),
    }
}

/// Build the backup path for `stem`/`extension` in `dir` at `timestamp`
pub fn timestamped_path(
    dir: &Path,
    stem: &str,
    extension: &str,
    timestamp: &DateTime<Local>,
) -> PathBuf {
    dir.join(format!(
        "{}{}{}",
        stem,
        timestamp.format(TIMESTAMP_FORMAT),
        extension
    ))
}

/// Components recovered from a backup file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupName {
    /// Stem of the source file at the time the name was built
    pub stem: String,
    /// Embedded modification time (local wall clock, second precision)
    pub timestamp: NaiveDateTime,
    /// Extension including the dot, or empty
    pub extension: String,
}

/// Parse a backup file name back into its components
///
/// Returns `None` when the name does not carry a well-formed suffix.
pub fn parse_backup_name(path: &Path) -> Option<BackupName> {
    let file_name = path.file_name()?.to_str()?;
    let (with_suffix, extension) = split_name(file_name);

    // A stem ending in `.` (source `file.`) has no extension, so its backup
    // `file.__<ts>` splits at the wrong dot; retry with the whole name.
    split_suffix(&with_suffix, extension).or_else(|| split_suffix(file_name, String::new()))
}

fn split_suffix(with_suffix: &str, extension: String) -> Option<BackupName> {
    let cut = with_suffix.len().checked_sub(SUFFIX_LEN)?;
    if !with_suffix.is_char_boundary(cut) {
        return None;
    }
    let (stem, suffix) = with_suffix.split_at(cut);
    let timestamp = NaiveDateTime::parse_from_str(suffix, TIMESTAMP_FORMAT).ok()?;

    Some(BackupName {
        stem: stem.to_string(),
        timestamp,
        extension,
    })
}
