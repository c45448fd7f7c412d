//! Backup Core - building blocks for single-file backup retention
//!
//! This crate provides the pieces the retention controller is assembled from:
//! - Policy (capacity bound + minimum interval) with validation
//! - Timestamped backup naming (`name__yyyy-MM-dd_HH-mm-ss.ext`)
//! - Watched file identity and backup records
//! - The bounded retention queue
//! - File I/O capability (copy/delete/rename/existence)
//! - Log sinks for user-visible status lines

pub mod error;
pub mod fsops;
pub mod naming;
pub mod policy;
pub mod queue;
pub mod record;
pub mod sink;

// Re-export main types for convenience
pub use error::{BackupError, ErrorKind, Result};
pub use fsops::{FileOps, StdFileOps};
pub use naming::{parse_backup_name, timestamped_path, BackupName, TIMESTAMP_FORMAT};
pub use policy::{Policy, DEFAULT_MAX_BACKUPS, DEFAULT_MINUTES};
pub use queue::RetentionQueue;
pub use record::{BackupRecord, WatchedFile};
pub use sink::{ChannelSink, LogLevel, LogLine, LogSink, MemorySink, TracingSink};
