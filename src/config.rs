//! Editor configuration, read from an optional `rowpad.toml`.
//!
//! Every field has a default, so an empty (or absent) file gives the stock behaviour.
//!
//! ```toml
//! tab_stop = 4
//! quit_times = 2
//!
//! [[language]]
//! name = "python"
//! filematch = [".py"]
//! comment = "#"
//! numbers = true
//! strings = true
//! ```

use crate::buffer::DEFAULT_TAB_STOP;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_FILE: &str = "rowpad.toml";
pub const CONFIG_ENV: &str = "ROWPAD_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub tab_stop: usize,
    /// Consecutive Ctrl-Q presses needed to quit with unsaved changes.
    pub quit_times: u32,
    pub message_timeout_secs: u64,
    /// How long one key read waits before the screen is redrawn anyway.
    pub idle_timeout_ms: u64,
    /// How long to wait for the rest of an escape sequence.
    pub escape_timeout_ms: u64,
    #[serde(rename = "language")]
    pub languages: Vec<LanguageConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            quit_times: 3,
            message_timeout_secs: 5,
            idle_timeout_ms: 100,
            escape_timeout_ms: 100,
            languages: Vec::new(),
        }
    }
}

/// A `[[language]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageConfig {
    pub name: String,
    pub filematch: Vec<String>,
    pub comment: Option<String>,
    #[serde(default)]
    pub numbers: bool,
    #[serde(default)]
    pub strings: bool,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(s)?;
        if cfg.tab_stop == 0 {
            bail!("tab_stop must be at least 1");
        }
        Ok(cfg)
    }

    /// Load the first config file found, or the defaults if there is none.
    pub fn load() -> Result<Self> {
        for path in search_paths() {
            if !path.is_file() {
                continue;
            }
            let s = fs::read_to_string(&path)
                .with_context(|| format!("Reading {}", path.display()))?;
            let cfg =
                Self::from_toml(&s).with_context(|| format!("Parsing {}", path.display()))?;
            log::info!("loaded config from {}", path.display());
            return Ok(cfg);
        }
        log::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_secs(self.message_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn escape_timeout(&self) -> Duration {
        Duration::from_millis(self.escape_timeout_ms)
    }
}

/// Where we look for the config file:
/// - `$ROWPAD_CONFIG`, if set
/// - `./rowpad.toml`
/// - `rowpad.toml` next to the executable
fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(p) = std::env::var_os(CONFIG_ENV) {
        paths.push(PathBuf::from(p));
    }
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(CONFIG_FILE));
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            paths.push(dir.join(CONFIG_FILE));
        }
    }

    paths
}
