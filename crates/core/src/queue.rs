//! Bounded, oldest-first queue of retained backups

use crate::record::BackupRecord;
use std::collections::VecDeque;
use std::path::Path;

/// Chronologically ordered backups, never longer than `capacity`
///
/// The queue only tracks records; deleting the file behind an evicted record
/// is the caller's job.
#[derive(Debug, Clone)]
pub struct RetentionQueue {
    records: VecDeque<BackupRecord>,
    capacity: usize,
}

impl RetentionQueue {
    /// Create an empty queue holding at most `capacity` records
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of records
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the next push has to be preceded by an eviction
    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Most recently added record
    pub fn latest(&self) -> Option<&BackupRecord> {
        self.records.back()
    }

    /// Record next in line for eviction
    pub fn oldest(&self) -> Option<&BackupRecord> {
        self.records.front()
    }

    /// Remove and return the oldest record
    pub fn pop_oldest(&mut self) -> Option<BackupRecord> {
        self.records.pop_front()
    }

    /// Append a record as the newest
    ///
    /// A record already tracked under the same path is moved to the back
    /// instead of being counted twice. Returns the record evicted to stay
    /// within capacity, if any.
    pub fn push(&mut self, record: BackupRecord) -> Option<BackupRecord> {
        self.remove_path(&record.path);
        let evicted = if self.is_full() {
            self.records.pop_front()
        } else {
            None
        };
        self.records.push_back(record);
        evicted
    }

    /// Whether a record with this path is tracked
    pub fn contains_path(&self, path: &Path) -> bool {
        self.records.iter().any(|r| r.path == path)
    }

    /// Forget the record stored under `path`
    pub fn remove_path(&mut self, path: &Path) -> Option<BackupRecord> {
        let idx = self.records.iter().position(|r| r.path == path)?;
        self.records.remove(idx)
    }

    /// Iterate oldest first
    pub fn iter(&self) -> impl Iterator<Item = &BackupRecord> {
        self.records.iter()
    }

    /// Iterate oldest first, mutably (each record visited exactly once)
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BackupRecord> {
        self.records.iter_mut()
    }

    /// Drop all records
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
