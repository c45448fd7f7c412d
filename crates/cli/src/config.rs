//! Optional TOML configuration
//!
//! ```toml
//! [policy]
//! max_backups = 10
//! min_interval_minutes = 10
//!
//! [watch]
//! debounce_ms = 200
//! ```
//!
//! Command-line flags win over the file, the file wins over built-in defaults.

use anyhow::{Context, Result};
use backup_core::Policy;
use retention::{ControllerOptions, WatchConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub policy: Policy,
    pub watch: WatchSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    /// Quiet period before a burst of writes counts as one change
    pub debounce_ms: u64,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: WatchConfig::default().debounce.as_millis() as u64,
        }
    }
}

impl Config {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            watch: WatchConfig {
                debounce: Duration::from_millis(self.watch.debounce_ms),
            },
        }
    }
}

/// `<config dir>/autobackup/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("autobackup").join("config.toml"))
}

/// Load the explicitly named file, or the default file if it exists
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => read(path),
        None => match default_path() {
            Some(path) if path.is_file() => read(&path),
            _ => Ok(Config::default()),
        },
    }
}

fn read(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    tracing::debug!("Loaded config from {}: {:?}", path.display(), config);
    Ok(config)
}
