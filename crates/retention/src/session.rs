//! Per-session retention state and event handlers
//!
//! A [`Session`] exists exactly while a file is being watched. It is only ever
//! touched under the controller's lock, so handlers here are plain `&mut self`
//! methods with no synchronisation of their own.

use backup_core::{
    BackupError, BackupRecord, FileOps, LogSink, Policy, Result, RetentionQueue, WatchedFile,
};
use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use watcher::WatchEvent;

/// What a handler did with an event
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Event did not concern the watched file, or was suppressed
    Ignored,
    /// Change seen but the minimum interval has not passed yet
    Throttled { elapsed_minutes: f64 },
    /// New backup written
    BackedUp {
        path: PathBuf,
        /// Oldest backup deleted to make room
        evicted: Option<PathBuf>,
    },
    /// Watched file renamed; `count` backups relocated
    Renamed { count: usize },
    /// Watched file restored from the newest backup
    Restored { from: PathBuf },
    /// Watched file deleted with no backup on hand
    NothingToRestore,
    /// Watch subsystem error written to the error stream
    ErrorLogged,
}

/// Read-only snapshot of a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub watched: WatchedFile,
    pub policy: Policy,
    /// Oldest first
    pub backups: Vec<BackupRecord>,
    /// Whether the next change to the watched file will be ignored
    pub suppress_next: bool,
}

/// State of one watch session
#[derive(Debug)]
pub struct Session {
    watched: WatchedFile,
    queue: RetentionQueue,
    policy: Policy,
    /// One-shot: set after a restore so the write it causes is not backed up
    suppress_next: bool,
}

impl Session {
    /// Open a session and take the seed backup
    ///
    /// The seed is taken regardless of the interval so that at least one
    /// backup exists before any change can be missed.
    pub fn begin(
        watched: WatchedFile,
        policy: Policy,
        ops: &dyn FileOps,
        sink: &dyn LogSink,
    ) -> Result<Self> {
        policy.validate()?;

        let mut session = Self {
            queue: RetentionQueue::new(policy.capacity()),
            watched,
            policy,
            suppress_next: false,
        };

        sink.info(&format!(
            "Watching File: {}\nMax Backups: {}\nMinutes Between Backups: {}",
            session.watched.name, policy.max_backups, policy.min_interval_minutes
        ));

        let modified = session.watched.modified;
        session.backup(modified, ops, sink)?;
        Ok(session)
    }

    /// Route an event to its handler
    pub fn handle(
        &mut self,
        event: WatchEvent,
        ops: &dyn FileOps,
        sink: &dyn LogSink,
    ) -> Result<EventOutcome> {
        match event {
            WatchEvent::Changed { path, modified } => {
                self.on_changed(&path, DateTime::<Local>::from(modified), ops, sink)
            }
            WatchEvent::Renamed { from, to } => self.on_renamed(&from, &to, ops, sink),
            WatchEvent::Deleted { path } => self.on_deleted(&path, ops, sink),
            WatchEvent::Error { message, trace } => Ok(self.on_error(message, &trace, sink)),
        }
    }

    /// Snapshot for callers outside the lock
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            watched: self.watched.clone(),
            policy: self.policy,
            backups: self.queue.iter().cloned().collect(),
            suppress_next: self.suppress_next,
        }
    }

    /// The file being watched
    pub fn watched(&self) -> &WatchedFile {
        &self.watched
    }

    /// Back up the watched file if the interval allows it
    pub fn on_changed(
        &mut self,
        path: &Path,
        modified: DateTime<Local>,
        ops: &dyn FileOps,
        sink: &dyn LogSink,
    ) -> Result<EventOutcome> {
        if !self.watched.is(path) {
            return Ok(EventOutcome::Ignored);
        }
        if std::mem::take(&mut self.suppress_next) {
            debug!("Ignoring change caused by restore of {}", path.display());
            return Ok(EventOutcome::Ignored);
        }

        self.watched.modified = modified;

        if let Some(latest) = self.queue.latest() {
            let elapsed = minutes_between(&latest.timestamp, &modified);
            sink.info(&format!(
                "File changed. Minutes since last backup: {}",
                format_minutes(elapsed)
            ));
            if !self.policy.interval_elapsed(elapsed) {
                return Ok(EventOutcome::Throttled {
                    elapsed_minutes: elapsed,
                });
            }
        } else {
            sink.info("File changed. No backups on hand.");
        }

        let (record, evicted) = self.backup(modified, ops, sink)?;
        Ok(EventOutcome::BackedUp {
            path: record.path,
            evicted,
        })
    }

    /// Follow the watched file to its new name, relocating every backup
    pub fn on_renamed(
        &mut self,
        from: &Path,
        to: &Path,
        ops: &dyn FileOps,
        sink: &dyn LogSink,
    ) -> Result<EventOutcome> {
        let suppressed = std::mem::take(&mut self.suppress_next);
        if suppressed || !self.watched.is(from) {
            return Ok(EventOutcome::Ignored);
        }

        let renamed = self
            .watched
            .renamed(to)
            .ok_or_else(|| BackupError::InvalidPath(to.to_path_buf()))?;
        sink.info(&format!(
            "File renamed: {} -> {}",
            self.watched.name, renamed.name
        ));
        self.watched = renamed;

        let stem = self.watched.stem.clone();
        let mut count = 0;
        for record in self.queue.iter_mut() {
            let target = record.relocated(&stem);
            if target != record.path {
                ops.rename(&record.path, &target)
                    .map_err(|e| BackupError::io("rename", &record.path, e))?;
                debug!("Relocated backup {} -> {}", record.path.display(), target.display());
                record.path = target;
            }
            count += 1;
        }

        Ok(EventOutcome::Renamed { count })
    }

    /// Restore the watched file from its newest backup
    pub fn on_deleted(
        &mut self,
        path: &Path,
        ops: &dyn FileOps,
        sink: &dyn LogSink,
    ) -> Result<EventOutcome> {
        if !self.watched.is(path) {
            return Ok(EventOutcome::Ignored);
        }

        let Some(latest) = self.queue.latest().cloned() else {
            sink.error(&format!(
                "File {} was deleted and no backup exists to restore it from.",
                self.watched.name
            ));
            return Ok(EventOutcome::NothingToRestore);
        };

        ops.copy(&latest.path, path)
            .map_err(|e| BackupError::io("restore", path, e))?;
        self.suppress_next = true;

        match ops.modified(path) {
            Ok(modified) => self.watched.modified = DateTime::<Local>::from(modified),
            Err(e) => warn!("Could not read modification time of {}: {}", path.display(), e),
        }

        sink.info(&format!(
            "File {} was deleted. Restored from most recent backup.",
            self.watched.name
        ));
        Ok(EventOutcome::Restored { from: latest.path })
    }

    /// Report a feed error; state is left alone
    pub fn on_error(&self, message: String, trace: &str, sink: &dyn LogSink) -> EventOutcome {
        let err = BackupError::WatchSubsystem(message);
        if trace.is_empty() {
            sink.error(&format!("ERROR: {err}"));
        } else {
            sink.error(&format!("ERROR: {err}\nStack trace:\n{trace}"));
        }
        EventOutcome::ErrorLogged
    }

    /// Copy the watched file to a new timestamped backup
    ///
    /// At capacity the oldest backup is deleted first. If the copy then fails
    /// the eviction stands and the new record is not enqueued.
    fn backup(
        &mut self,
        timestamp: DateTime<Local>,
        ops: &dyn FileOps,
        sink: &dyn LogSink,
    ) -> Result<(BackupRecord, Option<PathBuf>)> {
        let target = self.watched.backup_path(&timestamp);

        // Same-second saves share a name; the copy below refreshes that backup
        let mut evicted = None;
        if self.queue.is_full() && !self.queue.contains_path(&target) {
            if let Some(oldest) = self.queue.oldest().map(|r| r.path.clone()) {
                // Stays tracked until its file is gone
                match ops.remove(&oldest) {
                    Ok(()) => debug!("Deleted oldest backup {}", oldest.display()),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        warn!("Oldest backup {} was already gone", oldest.display())
                    }
                    Err(e) => return Err(BackupError::io("delete", &oldest, e)),
                }
                self.queue.pop_oldest();
                evicted = Some(oldest);
            }
        }

        if let Err(e) = ops.copy(&self.watched.path, &target) {
            if let Some(lost) = &evicted {
                sink.error(&format!(
                    "Backup failed after deleting oldest backup {}",
                    lost.display()
                ));
            }
            return Err(BackupError::io("copy", &target, e));
        }

        let record = BackupRecord::new(target, timestamp);
        let displaced = self.queue.push(record.clone());
        debug_assert!(displaced.is_none(), "eviction happens before the copy");

        sink.info(&format!("New backup created: {}", record.file_name()));
        Ok((record, evicted))
    }
}

fn minutes_between(earlier: &DateTime<Local>, later: &DateTime<Local>) -> f64 {
    (*later - *earlier).num_milliseconds() as f64 / 60_000.0
}

/// Minutes with at most two decimals, trailing zeros dropped (`2.5`, `0.33`, `12`)
fn format_minutes(minutes: f64) -> String {
    let fixed = format!("{minutes:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}
