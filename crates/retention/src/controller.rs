//! Backup retention controller: session lifecycle and event dispatch
//!
//! Two states: Idle (no session) and Watching. `start` moves Idle to Watching,
//! `stop` moves back. While Watching, a dispatcher thread drains the directory
//! feed and runs each event through the [`Session`] under a single lock, so a
//! change and a rename arriving together can never interleave.
//!
//! `stop` first takes the session out from under the lock (waiting for an
//! in-flight handler to finish), then shuts the feed down and joins the
//! dispatcher. No handler runs after `stop` returns. Do not call `stop` from
//! inside a [`LogSink`] callback: it would wait on its own thread.

use crate::session::{EventOutcome, Session, SessionStatus};
use backup_core::{BackupError, FileOps, LogSink, Policy, Result, StdFileOps, TracingSink, WatchedFile};
use chrono::{DateTime, Local};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};
use watcher::{DirectoryFeed, WatchConfig, WatchEvent};

/// Controller tuning
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerOptions {
    /// Directory feed settings
    pub watch: WatchConfig,
}

/// State shared with the dispatcher thread
struct Shared {
    session: Mutex<Option<Session>>,
    ops: Arc<dyn FileOps>,
    sink: Arc<dyn LogSink>,
}

impl Shared {
    /// Run one event under the session lock; errors go to the error stream
    fn dispatch(&self, event: WatchEvent) -> Result<EventOutcome> {
        let mut guard = self.session.lock();
        let session = guard.as_mut().ok_or(BackupError::NotWatching)?;

        match session.handle(event, self.ops.as_ref(), self.sink.as_ref()) {
            Ok(outcome) => {
                debug!("Event handled: {:?}", outcome);
                Ok(outcome)
            }
            Err(e) => {
                self.sink.error(&format!("ERROR: {e}"));
                Err(e)
            }
        }
    }
}

/// Feed and dispatcher owned by an active session
struct Runtime {
    feed: DirectoryFeed,
    dispatcher: JoinHandle<()>,
}

/// Watches one file and keeps a bounded, time-throttled set of backups
pub struct BackupRetentionController {
    shared: Arc<Shared>,
    options: ControllerOptions,
    /// Also serialises start/stop
    runtime: Mutex<Option<Runtime>>,
}

impl BackupRetentionController {
    /// Create an idle controller using `std::fs` and the given sink
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self::with_options(Arc::new(StdFileOps), sink, ControllerOptions::default())
    }

    /// Create an idle controller with custom file operations and tuning
    pub fn with_options(
        ops: Arc<dyn FileOps>,
        sink: Arc<dyn LogSink>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(None),
                ops,
                sink,
            }),
            options,
            runtime: Mutex::new(None),
        }
    }

    /// Start watching `path`
    ///
    /// Validates the request, opens the directory feed, takes the seed backup
    /// and begins dispatching events. Any failure leaves the controller Idle.
    pub fn start(
        &self,
        path: impl AsRef<Path>,
        max_backups: i64,
        min_interval_minutes: i64,
    ) -> Result<SessionStatus> {
        let path = path.as_ref();
        let mut runtime = self.runtime.lock();

        if let Some(session) = self.shared.session.lock().as_ref() {
            return Err(BackupError::AlreadyWatching(session.watched().path.clone()));
        }

        let ops = self.shared.ops.as_ref();
        if !ops.is_file(path) {
            return Err(BackupError::InvalidPath(path.to_path_buf()));
        }
        let path = path
            .canonicalize()
            .map_err(|_| BackupError::InvalidPath(path.to_path_buf()))?;
        let policy = Policy::new(max_backups, min_interval_minutes)?;

        let modified = ops
            .modified(&path)
            .map_err(|e| BackupError::io("read modification time of", &path, e))?;
        let watched = WatchedFile::new(&path, DateTime::<Local>::from(modified))
            .ok_or_else(|| BackupError::InvalidPath(path.clone()))?;

        // Subscribe before the seed copy so nothing written after it is missed;
        // events queue on the channel until the dispatcher starts.
        let (feed, events) = DirectoryFeed::spawn(&watched.dir, self.options.watch)
            .map_err(|e| BackupError::WatchSubsystem(e.to_string()))?;

        let session = Session::begin(watched, policy, ops, self.shared.sink.as_ref())?;
        let status = session.status();
        *self.shared.session.lock() = Some(session);

        let shared = Arc::clone(&self.shared);
        let dispatcher = match std::thread::Builder::new()
            .name("autobackup-dispatch".to_string())
            .spawn(move || run_dispatcher(shared, events))
        {
            Ok(handle) => handle,
            Err(e) => {
                self.shared.session.lock().take();
                return Err(BackupError::io("spawn dispatcher for", &path, e));
            }
        };

        info!(
            "Started watching {} (max backups: {}, minutes between: {})",
            path.display(),
            policy.max_backups,
            policy.min_interval_minutes
        );
        *runtime = Some(Runtime { feed, dispatcher });
        Ok(status)
    }

    /// Stop watching
    ///
    /// Returns `NotWatching` when already Idle; that is harmless and leaves
    /// the controller unchanged. Backup files stay on disk.
    pub fn stop(&self) -> Result<()> {
        let mut runtime = self.runtime.lock();
        let session = self.shared.session.lock().take();

        if let Some(Runtime { feed, dispatcher }) = runtime.take() {
            feed.stop();
            if dispatcher.join().is_err() {
                warn!("Dispatcher thread panicked");
            }
        }

        match session {
            Some(session) => {
                info!("Stopped watching {}", session.watched().path.display());
                Ok(())
            }
            None => Err(BackupError::NotWatching),
        }
    }

    /// Run an event through the active session on the caller's thread
    ///
    /// Hosts with their own notification source can drive the controller
    /// this way; it takes the same lock as the feed dispatcher.
    pub fn handle(&self, event: WatchEvent) -> Result<EventOutcome> {
        self.shared.dispatch(event)
    }

    /// Whether a session is active
    pub fn is_watching(&self) -> bool {
        self.shared.session.lock().is_some()
    }

    /// Snapshot of the active session
    pub fn status(&self) -> Option<SessionStatus> {
        self.shared.session.lock().as_ref().map(Session::status)
    }
}

impl Default for BackupRetentionController {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl Drop for BackupRetentionController {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn run_dispatcher(shared: Arc<Shared>, events: Receiver<WatchEvent>) {
    for event in events.iter() {
        match shared.dispatch(event) {
            Err(BackupError::NotWatching) => break,
            // Already on the error stream; the session carries on
            Ok(_) | Err(_) => {}
        }
    }
    debug!("Dispatcher exiting");
}
