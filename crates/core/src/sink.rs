//! Log sinks for user-visible status lines
//!
//! The controller reports what it does ("New backup created: ...") through a
//! [`LogSink`] with an informational and an error stream. Front-ends subscribe
//! by picking or implementing a sink; diagnostics go to `tracing` separately.

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

/// Which stream a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

/// A single status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
}

/// Destination for status lines
pub trait LogSink: Send + Sync {
    /// Informational line
    fn info(&self, message: &str);

    /// Error line
    fn error(&self, message: &str);
}

/// Forwards lines to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!(target: "autobackup", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "autobackup", "{}", message);
    }
}

/// Buffers lines in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<LogLine>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines so far, in order
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }

    /// Messages from the info stream
    pub fn infos(&self) -> Vec<String> {
        self.messages(LogLevel::Info)
    }

    /// Messages from the error stream
    pub fn errors(&self) -> Vec<String> {
        self.messages(LogLevel::Error)
    }

    /// Whether any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|l| l.message.contains(needle))
    }

    /// Drop buffered lines
    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|l| l.level == level)
            .map(|l| l.message.clone())
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.lines.lock().push(LogLine {
            level,
            message: message.to_string(),
        });
    }
}

impl LogSink for MemorySink {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

/// Pushes lines onto a channel for an asynchronous subscriber (e.g. a GUI)
///
/// Lines are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<LogLine>,
}

impl ChannelSink {
    /// Create a sink and the receiver its lines arrive on
    pub fn new() -> (Self, Receiver<LogLine>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }

    fn send(&self, level: LogLevel, message: &str) {
        let _ = self.tx.send(LogLine {
            level,
            message: message.to_string(),
        });
    }
}

impl LogSink for ChannelSink {
    fn info(&self, message: &str) {
        self.send(LogLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.send(LogLevel::Error, message);
    }
}
