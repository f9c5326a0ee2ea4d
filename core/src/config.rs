//! Settings management.
//!
//! Stores settings in JSON format at `~/.portpilot/config.json`. Every field
//! carries a serde default, so files written by older versions (or edited by
//! hand) merge with the defaults when loaded.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::adapters::store::{write_json_atomic, TUNNELS_FILE};
use crate::error::{Error, Result};

/// Name of the settings directory under the user's home.
pub const CONFIG_DIR_NAME: &str = ".portpilot";

/// File name of the settings file inside the config directory.
pub const CONFIG_FILE: &str = "config.json";

/// Default settings directory (`~/.portpilot`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Graceful and hard wait budgets for an escalating stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutSettings {
    /// Wait after the graceful signal before escalating.
    pub graceful_ms: u64,
    /// Wait after the hard signal before giving up.
    pub hard_ms: u64,
}

impl TimeoutSettings {
    pub fn graceful(&self) -> Duration {
        Duration::from_millis(self.graceful_ms)
    }

    pub fn hard(&self) -> Duration {
        Duration::from_millis(self.hard_ms)
    }
}

fn default_refresh_interval_ms() -> u64 {
    5000
}

fn default_ssh_program() -> String {
    "ssh".to_string()
}

fn default_kill_timeouts() -> TimeoutSettings {
    TimeoutSettings {
        graceful_ms: 3000,
        hard_ms: 2000,
    }
}

fn default_tunnel_stop_timeouts() -> TimeoutSettings {
    TimeoutSettings {
        graceful_ms: 5000,
        hard_ms: 2000,
    }
}

fn default_port_filters() -> BTreeMap<String, Vec<u16>> {
    BTreeMap::from([
        ("http".to_string(), vec![80, 443, 8080, 8443]),
        ("dev".to_string(), vec![3000, 5000, 8000, 5173, 5174]),
        ("db".to_string(), vec![5432, 3306, 27017, 6379]),
    ])
}

/// User settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Refresh interval for front-ends that poll, in milliseconds.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Start enabled tunnels when the engine is created.
    #[serde(default)]
    pub tunnel_auto_start: bool,

    /// Program used for tunnels. Must accept OpenSSH arguments.
    #[serde(default = "default_ssh_program")]
    pub ssh_program: String,

    /// Tunnel store location. `None` means `tunnels.json` next to the settings file.
    #[serde(default)]
    pub tunnels_path: Option<PathBuf>,

    #[serde(default = "default_kill_timeouts")]
    pub kill_timeouts: TimeoutSettings,

    #[serde(default = "default_tunnel_stop_timeouts")]
    pub tunnel_stop_timeouts: TimeoutSettings,

    /// Named port presets for list filtering.
    #[serde(default = "default_port_filters")]
    pub port_filters: BTreeMap<String, Vec<u16>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            tunnel_auto_start: false,
            ssh_program: default_ssh_program(),
            tunnels_path: None,
            kill_timeouts: default_kill_timeouts(),
            tunnel_stop_timeouts: default_tunnel_stop_timeouts(),
            port_filters: default_port_filters(),
        }
    }
}

impl Settings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Ports of a named preset, if defined.
    pub fn preset(&self, name: &str) -> Option<&[u16]> {
        self.port_filters.get(name).map(Vec::as_slice)
    }
}

/// Reads and writes [`Settings`] and resolves the paths derived from them.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    /// Store in the default directory (`~/.portpilot`).
    pub fn new() -> Result<Self> {
        Ok(Self { dir: config_dir()? })
    }

    /// Store in a custom directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Tunnel store path for `settings`, relative paths resolved against the config dir.
    pub fn tunnels_path(&self, settings: &Settings) -> PathBuf {
        match &settings.tunnels_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.dir.join(path),
            None => self.dir.join(TUNNELS_FILE),
        }
    }

    /// Strict load. A missing file yields the defaults.
    pub fn try_load(&self) -> Result<Settings> {
        let path = self.settings_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => return Err(Error::Config(format!("Failed to read settings: {}", e))),
        };

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse settings: {}", e)))
    }

    /// Load settings, falling back to the defaults if the file can't be used.
    pub fn load(&self) -> Settings {
        self.try_load().unwrap_or_else(|e| {
            warn!(path = %self.settings_path().display(), error = %e, "Using default settings");
            Settings::default()
        })
    }

    /// Save settings, creating the directory if needed.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        write_json_atomic(&self.settings_path(), settings)
    }
}
