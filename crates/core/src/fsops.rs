//! File I/O capability consumed by the retention controller
//!
//! Kept behind a trait so hosts can substitute their own storage and tests
//! can inject failures.

use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Local file operations on absolute paths
pub trait FileOps: Send + Sync {
    /// Whether `path` names an existing regular file
    fn is_file(&self, path: &Path) -> bool;

    /// Copy `from` to `to`, overwriting `to`
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Delete a file
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Move a file
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Last modification time
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

/// [`FileOps`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileOps;

impl FileOps for StdFileOps {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::copy(from, to).map(|_| ())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_std_ops_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("a.txt");
        let copy = temp_dir.path().join("b.txt");
        let moved = temp_dir.path().join("c.txt");
        fs::write(&src, b"hello").unwrap();

        let ops = StdFileOps;
        assert!(ops.is_file(&src));
        assert!(!ops.is_file(temp_dir.path()));

        ops.copy(&src, &copy).unwrap();
        assert_eq!(fs::read(&copy).unwrap(), b"hello");

        fs::write(&src, b"overwritten").unwrap();
        ops.copy(&src, &copy).unwrap();
        assert_eq!(fs::read(&copy).unwrap(), b"overwritten");

        ops.rename(&copy, &moved).unwrap();
        assert!(!copy.exists());
        ops.remove(&moved).unwrap();
        assert!(!moved.exists());
    }

    #[test]
    fn test_modified_reads_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, b"x").unwrap();

        let when = SystemTime::now() - Duration::from_secs(3600);
        set_file_mtime(&file, FileTime::from_system_time(when)).unwrap();

        let got = StdFileOps.modified(&file).unwrap();
        let drift = got
            .duration_since(when)
            .unwrap_or_else(|e| e.duration());
        assert!(drift < Duration::from_secs(1));
    }
}
