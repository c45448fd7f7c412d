//! Per-path debouncing logic
//!
//! A single save usually produces several write notifications. Each path is
//! held until no new notification has arrived for `window`, then released
//! once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Trailing-edge debouncer keyed by path
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    /// path -> time of the latest notification
    pending: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    /// Record a notification for `path`, pushing its release time back
    pub fn touch(&mut self, path: PathBuf, now: Instant) {
        self.pending.insert(path, now);
    }

    /// Forget `path`; returns whether it was pending
    pub fn take(&mut self, path: &Path) -> bool {
        self.pending.remove(path).is_some()
    }

    /// Remove and return every path whose window has elapsed
    pub fn due(&mut self, now: Instant) -> Vec<PathBuf> {
        let window = self.window;
        let ready: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, &last)| now.saturating_duration_since(last) >= window)
            .map(|(path, _)| path.clone())
            .collect();

        for path in &ready {
            self.pending.remove(path);
        }
        ready
    }

    /// Earliest instant at which some path becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().map(|&last| last + self.window)
    }

    /// Number of paths waiting
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
