//! File system watching for autobackup
//!
//! This crate turns raw OS notifications for one directory into the small
//! event vocabulary the retention controller understands:
//! - `Changed(path, modified)` after a burst of writes settles (per-path debouncing)
//! - `Renamed(old, new)` with from/to notifications paired up
//! - `Deleted(path)`
//! - `Error(details)` for failures reported by the backend
//!
//! Only write-time and name changes are surfaced; creates and accesses are
//! filtered out.

pub mod debounce;
pub mod error;
pub mod event;
pub mod feed;
pub mod normalize;

pub use error::{Result, WatchError};
pub use event::WatchEvent;
pub use feed::{DirectoryFeed, WatchConfig};
