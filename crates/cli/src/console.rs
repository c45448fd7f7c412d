//! Status lines on the terminal

use backup_core::LogSink;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Info lines to stdout, error lines to stderr (red when stderr is a terminal)
pub struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            color: std::io::stderr().is_terminal(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for ConsoleSink {
    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn error(&self, message: &str) {
        if self.color {
            eprintln!("{}", message.red());
        } else {
            eprintln!("{message}");
        }
    }
}
