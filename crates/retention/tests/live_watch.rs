//! End-to-end runs against the real filesystem notifier

use backup_core::{parse_backup_name, MemorySink};
use filetime::FileTime;
use retention::{BackupRetentionController, ControllerOptions, SessionStatus, WatchConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(10);

fn controller() -> (BackupRetentionController, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let options = ControllerOptions {
        watch: WatchConfig {
            debounce: Duration::from_millis(50),
        },
    };
    let controller = BackupRetentionController::with_options(
        Arc::new(backup_core::StdFileOps),
        sink.clone(),
        options,
    );
    (controller, sink)
}

fn wait_for(controller: &BackupRetentionController, pred: impl Fn(&SessionStatus) -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if controller.status().as_ref().is_some_and(&pred) {
            return true;
        }
        thread::sleep(Duration::from_millis(25));
    }
    false
}

fn backups_on_disk(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| parse_backup_name(p).is_some())
        .collect()
}

/// Rewrite the file with an mtime `minutes` after `base`
fn touch_later(file: &Path, contents: &str, base: SystemTime, minutes: u64) {
    fs::write(file, contents).unwrap();
    let mtime = base + Duration::from_secs(60 * minutes);
    filetime::set_file_mtime(file, FileTime::from_system_time(mtime)).unwrap();
}

#[test]
fn test_change_creates_backup() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().canonicalize().unwrap();
    let file = dir.join("notes.txt");
    fs::write(&file, "v1").unwrap();

    let (controller, sink) = controller();
    let status = controller.start(&file, 5, 1).unwrap();
    let base = SystemTime::from(status.watched.modified);

    touch_later(&file, "v2", base, 2);
    assert!(
        wait_for(&controller, |s| s.backups.len() == 2),
        "expected a second backup, log: {:?}",
        sink.lines()
    );
    assert!(sink.contains("New backup created: notes__"));

    controller.stop().unwrap();
    assert_eq!(backups_on_disk(&dir).len(), 2);
}

#[test]
fn test_delete_restores_latest_backup() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().canonicalize().unwrap();
    let file = dir.join("config.ini");
    fs::write(&file, "original").unwrap();

    let (controller, sink) = controller();
    controller.start(&file, 3, 10).unwrap();

    fs::remove_file(&file).unwrap();
    let deadline = Instant::now() + TIMEOUT;
    while !sink.contains("was deleted. Restored from most recent backup.") && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(25));
    }

    assert!(file.exists(), "file should be restored, log: {:?}", sink.lines());
    assert_eq!(fs::read_to_string(&file).unwrap(), "original");
    assert!(controller.is_watching());
    controller.stop().unwrap();
}

#[test]
fn test_rename_moves_backups() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().canonicalize().unwrap();
    let file = dir.join("draft.md");
    fs::write(&file, "text").unwrap();

    let (controller, sink) = controller();
    controller.start(&file, 3, 10).unwrap();

    let renamed = dir.join("final.md");
    fs::rename(&file, &renamed).unwrap();
    assert!(
        wait_for(&controller, |s| s.watched.path == renamed),
        "rename not observed, log: {:?}",
        sink.lines()
    );

    let status = controller.status().unwrap();
    let backup = &status.backups[0].path;
    assert!(backup.exists());
    assert_eq!(parse_backup_name(backup).unwrap().stem, "final");
    controller.stop().unwrap();
}

#[test]
fn test_no_events_after_stop() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().canonicalize().unwrap();
    let file = dir.join("a.txt");
    fs::write(&file, "v1").unwrap();

    let (controller, _) = controller();
    let status = controller.start(&file, 5, 0).unwrap();
    let base = SystemTime::from(status.watched.modified);
    controller.stop().unwrap();

    touch_later(&file, "v2", base, 5);
    fs::remove_file(&file).unwrap();
    thread::sleep(Duration::from_millis(300));

    assert!(!file.exists());
    assert_eq!(backups_on_disk(&dir).len(), 1);
}
