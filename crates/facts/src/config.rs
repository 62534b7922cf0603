//! Watch configuration: which fact files to follow and how events settle.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

fn default_debounce_ms() -> u64 {
    100
}

/// Configuration for a fact watch session.
///
/// Mirrors the YAML mapping accepted on the command line:
///
/// ```yaml
/// files:
///   - facts.yml
///   - /etc/app/more-facts.yml
/// debounce_ms: 100
/// ```
///
/// A missing or empty `files` list means there is nothing to watch. Unknown
/// keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Fact files, absolute or relative to the current working directory.
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Settle window for filesystem events in milliseconds. `0` dispatches
    /// every event as soon as it arrives.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl WatchConfig {
    /// Config watching the given files with the default settle window.
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Override the settle window.
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Parse a config from YAML text. Empty text yields the default config.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let parsed: Option<Self> = serde_yaml::from_str(text)?;
        Ok(parsed.unwrap_or_default())
    }

    /// Read and parse a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Whether the config names no file at all.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
