//! Directory feed backed by the platform's recommended notify watcher
//!
//! notify runs its callback on an internal thread. The callback only forwards
//! raw results onto a channel; a dedicated pump thread normalises, debounces
//! and delivers [`WatchEvent`]s to the consumer.

use crate::debounce::Debouncer;
use crate::error::{Result, WatchError};
use crate::event::WatchEvent;
use crate::normalize::{EventNormalizer, RawChange};
use crossbeam_channel::{self as channel, Receiver, Sender};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Feed tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    /// Quiet period before a burst of writes is reported as one change
    pub debounce: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(200),
        }
    }
}

/// Live subscription to one directory (non-recursive)
///
/// Dropping the feed stops the pump thread and releases the OS watch.
pub struct DirectoryFeed {
    dir: PathBuf,
    stop_tx: Sender<()>,
    thread: Option<JoinHandle<()>>,
    _watcher: RecommendedWatcher,
}

impl DirectoryFeed {
    /// Start watching `dir`; events arrive on the returned receiver
    pub fn spawn(dir: &Path, config: WatchConfig) -> Result<(Self, Receiver<WatchEvent>)> {
        if !dir.is_dir() {
            return Err(WatchError::DirectoryNotFound(dir.to_path_buf()));
        }

        let (raw_tx, raw_rx) = channel::unbounded::<notify::Result<notify::Event>>();
        let (events_tx, events_rx) = channel::unbounded::<WatchEvent>();
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = raw_tx.send(res);
        })?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        let thread = std::thread::Builder::new()
            .name("autobackup-feed".to_string())
            .spawn(move || pump(raw_rx, stop_rx, events_tx, config.debounce))?;

        info!("Watching directory: {}", dir.display());

        Ok((
            Self {
                dir: dir.to_path_buf(),
                stop_tx,
                thread: Some(thread),
                _watcher: watcher,
            },
            events_rx,
        ))
    }

    /// Watched directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stop the pump thread and wait for it to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.try_send(());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Feed thread for {} panicked", self.dir.display());
            }
            debug!("Stopped watching directory: {}", self.dir.display());
        }
    }
}

impl Drop for DirectoryFeed {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Pump loop: raw notifications in, settled events out
fn pump(
    raw_rx: Receiver<notify::Result<notify::Event>>,
    stop_rx: Receiver<()>,
    events_tx: Sender<WatchEvent>,
    window: Duration,
) {
    let mut normalizer = EventNormalizer::new();
    let mut debouncer = Debouncer::new(window);

    loop {
        let deadline = [normalizer.next_deadline(), debouncer.next_deadline()]
            .into_iter()
            .flatten()
            .min();
        let tick = match deadline {
            Some(at) => channel::at(at),
            None => channel::never(),
        };

        let mut out = Vec::new();
        channel::select! {
            recv(stop_rx) -> _ => break,
            recv(raw_rx) -> msg => {
                let Ok(res) = msg else { break };
                let now = Instant::now();
                match res {
                    Ok(event) => {
                        for change in normalizer.push(event, now) {
                            apply(change, &mut debouncer, &mut out, now);
                        }
                    }
                    Err(err) => out.push(WatchEvent::from_error(&err)),
                }
            }
            recv(tick) -> _ => {
                let now = Instant::now();
                for change in normalizer.expire(now) {
                    apply(change, &mut debouncer, &mut out, now);
                }
                out.extend(debouncer.due(now).into_iter().filter_map(settle));
            }
        }

        for event in out {
            if events_tx.send(event).is_err() {
                debug!("Event receiver dropped; stopping feed");
                return;
            }
        }
    }
}

fn apply(change: RawChange, debouncer: &mut Debouncer, out: &mut Vec<WatchEvent>, now: Instant) {
    match change {
        RawChange::Modified(path) => debouncer.touch(path, now),
        RawChange::Renamed { from, to } => {
            // A write still settling under the old name belongs to the new one
            if debouncer.take(&from) {
                debouncer.touch(to.clone(), now);
            }
            out.push(WatchEvent::Renamed { from, to });
        }
        RawChange::Removed(path) => {
            debouncer.take(&path);
            out.push(WatchEvent::Deleted { path });
        }
    }
}

/// Read the modification time of a path whose writes have settled
fn settle(path: PathBuf) -> Option<WatchEvent> {
    match std::fs::metadata(&path).and_then(|m| m.modified()) {
        Ok(modified) => Some(WatchEvent::Changed { path, modified }),
        Err(e) => {
            debug!("Dropping change for {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::fs;
    use tempfile::TempDir;

    fn recv_until(
        rx: &Receiver<WatchEvent>,
        timeout: Duration,
        pred: impl Fn(&WatchEvent) -> bool,
    ) -> Option<WatchEvent> {
        let deadline = Instant::now() + timeout;
        while let Ok(event) = rx.recv_deadline(deadline) {
            if pred(&event) {
                return Some(event);
            }
        }
        None
    }

    #[test]
    fn test_missing_directory_is_rejected() {
        let result = DirectoryFeed::spawn(Path::new("/nonexistent/path/12345"), WatchConfig::default());
        assert!(matches!(result, Err(WatchError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_settle_reads_mtime_and_skips_vanished() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, b"x").unwrap();

        let pinned = FileTime::from_unix_time(1_700_000_000, 0);
        filetime::set_file_mtime(&file, pinned).unwrap();

        match settle(file.clone()) {
            Some(WatchEvent::Changed { modified, .. }) => {
                assert_eq!(FileTime::from_system_time(modified), pinned);
            }
            other => panic!("expected a change, got {other:?}"),
        }
        fs::remove_file(&file).unwrap();
        assert!(settle(file).is_none());
    }

    #[test]
    fn test_rename_carries_pending_write_to_new_name() {
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        let mut out = Vec::new();
        let now = Instant::now();

        apply(RawChange::Modified(PathBuf::from("/w/a")), &mut debouncer, &mut out, now);
        apply(
            RawChange::Renamed {
                from: PathBuf::from("/w/a"),
                to: PathBuf::from("/w/b"),
            },
            &mut debouncer,
            &mut out,
            now,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(
            debouncer.due(now + Duration::from_millis(20)),
            vec![PathBuf::from("/w/b")]
        );
    }

    #[test]
    fn test_feed_reports_write_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().canonicalize().unwrap();
        let file = dir.join("watched.txt");
        fs::write(&file, b"v1").unwrap();

        let config = WatchConfig {
            debounce: Duration::from_millis(50),
        };
        let (feed, rx) = DirectoryFeed::spawn(&dir, config).unwrap();
        assert_eq!(feed.dir(), dir.as_path());

        fs::write(&file, b"v2").unwrap();
        let changed = recv_until(&rx, Duration::from_secs(5), |e| {
            matches!(e, WatchEvent::Changed { path, .. } if *path == file)
        });
        assert!(changed.is_some(), "expected a change event");

        fs::remove_file(&file).unwrap();
        let deleted = recv_until(&rx, Duration::from_secs(5), |e| {
            matches!(e, WatchEvent::Deleted { path } if *path == file)
        });
        assert!(deleted.is_some(), "expected a delete event");

        feed.stop();
    }
}
