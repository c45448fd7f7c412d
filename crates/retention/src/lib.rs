//! Backup retention for a single watched file
//!
//! This crate provides the state machine that decides what happens to the
//! backups of one file:
//! - A seed backup when watching starts
//! - Time-throttled backups on change, evicting the oldest at capacity
//! - Backup relocation when the file is renamed
//! - Restore from the newest backup when the file is deleted
//!
//! [`BackupRetentionController`] owns the session and the directory feed;
//! [`Session`] holds the per-session state and the event handlers.

pub mod controller;
pub mod session;

// Re-exports
pub use controller::{BackupRetentionController, ControllerOptions};
pub use session::{EventOutcome, Session, SessionStatus};

pub use backup_core::{BackupError, ErrorKind, Policy, Result};
pub use watcher::{WatchConfig, WatchEvent};
