//! Normalisation of raw notify events
//!
//! Backends disagree on how renames are reported: inotify sends a `From`, a
//! `To` and then a combined `Both`; FSEvents sends an unqualified name change
//! per path; Windows sends `From`/`To`. The normaliser pairs these up into a
//! single rename and filters everything that is not a write-time or name
//! change.

use notify::event::{MetadataKind, ModifyKind, RenameMode};
use notify::EventKind;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// A change before debouncing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawChange {
    Modified(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
    Removed(PathBuf),
}

/// Rename source waiting for its destination
#[derive(Debug)]
struct PendingFrom {
    at: Instant,
    path: PathBuf,
    /// Backend cookie linking the two halves of one rename, when provided
    tracker: Option<usize>,
}

/// Stateful converter from notify events to [`RawChange`]s
#[derive(Debug, Default)]
pub struct EventNormalizer {
    /// Rename sources still waiting for their destination
    pending_from: VecDeque<PendingFrom>,
    /// Pairs already reported, so a trailing `Both` is not reported twice
    reported: VecDeque<(PathBuf, PathBuf)>,
}

impl EventNormalizer {
    /// How long a rename source waits for its destination before it counts as a removal
    pub const MAX_AGE: Duration = Duration::from_secs(1);
    const MAX_PENDING: usize = 64;
    const MAX_REPORTED: usize = 16;

    /// Create a new normaliser
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert one notify event
    pub fn push(&mut self, event: notify::Event, now: Instant) -> Vec<RawChange> {
        let mut out = self.expire(now);
        let tracker = event.tracker();

        match event.kind {
            EventKind::Remove(_) => out.extend(event.paths.into_iter().map(RawChange::Removed)),
            EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any))
            | EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Modify(ModifyKind::Other) => {
                out.extend(event.paths.into_iter().map(RawChange::Modified))
            }
            EventKind::Modify(ModifyKind::Name(mode)) => match mode {
                RenameMode::Both => out.extend(self.both(event.paths)),
                RenameMode::From => {
                    for path in event.paths {
                        self.pending_from.push_back(PendingFrom { at: now, path, tracker });
                    }
                    out.extend(self.expire(now));
                }
                RenameMode::To => {
                    for to in event.paths {
                        out.extend(self.pair_to(to, tracker));
                    }
                }
                // Unqualified: the side that no longer exists is the source
                RenameMode::Any | RenameMode::Other => {
                    for path in event.paths {
                        if path.exists() {
                            out.extend(self.pair_to(path, tracker));
                        } else {
                            self.pending_from.push_back(PendingFrom { at: now, path, tracker });
                        }
                    }
                }
            },
            // Creates, accesses and non-write metadata are outside the filter
            _ => {}
        }

        out
    }

    /// Deadline of the oldest unpaired rename source
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending_from.front().map(|p| p.at + Self::MAX_AGE)
    }

    /// Turn expired or excess rename sources into removals
    pub fn expire(&mut self, now: Instant) -> Vec<RawChange> {
        let mut out = Vec::new();

        while let Some(pending) = self.pending_from.front() {
            if now.saturating_duration_since(pending.at) < Self::MAX_AGE
                && self.pending_from.len() <= Self::MAX_PENDING
            {
                break;
            }
            if let Some(pending) = self.pending_from.pop_front() {
                out.push(RawChange::Removed(pending.path));
            }
        }

        out
    }

    fn pair_to(&mut self, to: PathBuf, tracker: Option<usize>) -> Option<RawChange> {
        // A destination without a source is a file moved in from elsewhere,
        // which is a create as far as the filter is concerned.
        let idx = match tracker {
            Some(id) => self
                .pending_from
                .iter()
                .position(|p| p.tracker == Some(id))
                .or_else(|| self.pending_from.iter().position(|p| p.tracker.is_none()))?,
            None => 0,
        };
        let from = self.pending_from.remove(idx)?.path;
        self.remember(from.clone(), to.clone());
        Some(RawChange::Renamed { from, to })
    }

    fn both(&mut self, paths: Vec<PathBuf>) -> Vec<RawChange> {
        let mut out = Vec::new();
        let mut it = paths.into_iter();
        while let Some(from) = it.next() {
            let Some(to) = it.next() else {
                out.push(RawChange::Modified(from));
                break;
            };

            if let Some(idx) = self.reported.iter().position(|(f, t)| *f == from && *t == to) {
                self.reported.remove(idx);
                continue;
            }
            if let Some(idx) = self.pending_from.iter().position(|p| p.path == from) {
                self.pending_from.remove(idx);
            }
            out.push(RawChange::Renamed { from, to });
        }
        out
    }

    fn remember(&mut self, from: PathBuf, to: PathBuf) {
        self.reported.push_back((from, to));
        while self.reported.len() > Self::MAX_REPORTED {
            self.reported.pop_front();
        }
    }
}
