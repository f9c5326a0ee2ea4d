//! JSON file persistence.
//!
//! Tunnel definitions are stored in `~/.portpilot/tunnels.json` as a map from
//! name to definition.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::config::config_dir;
use crate::domain::TunnelDefinition;
use crate::error::{Error, Result};
use crate::ports::TunnelRepository;

/// File name of the tunnel store inside the config directory.
pub const TUNNELS_FILE: &str = "tunnels.json";

/// Serialize `value` to `path` without ever exposing a half-written file.
///
/// The data goes to a temp file in the same directory, is flushed to disk and
/// then renamed over the target. On any earlier failure the temp file is
/// removed when it drops.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|e| {
        Error::Storage(format!("Failed to create {}: {}", parent.display(), e))
    })?;

    let tmp = NamedTempFile::new_in(parent)
        .map_err(|e| Error::Storage(format!("Failed to create temp file: {}", e)))?;

    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, value)
            .map_err(|e| Error::Storage(format!("Failed to serialize: {}", e)))?;
        writer
            .flush()
            .map_err(|e| Error::Storage(format!("Failed to write: {}", e)))?;
    }

    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::Storage(format!("Failed to sync: {}", e)))?;

    tmp.persist(path).map_err(|e| {
        Error::Storage(format!("Failed to save {}: {}", path.display(), e.error))
    })?;

    Ok(())
}

/// Tunnel repository backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonTunnelStore {
    path: PathBuf,
}

impl JsonTunnelStore {
    /// Store at the default location (`~/.portpilot/tunnels.json`).
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: config_dir()?.join(TUNNELS_FILE),
        })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TunnelRepository for JsonTunnelStore {
    fn load(&self) -> Result<BTreeMap<String, TunnelDefinition>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let mut tunnels: BTreeMap<String, TunnelDefinition> = serde_json::from_str(&content)
            .map_err(|e| {
                Error::Storage(format!("Failed to parse {}: {}", self.path.display(), e))
            })?;

        // The map key is authoritative
        for (name, def) in tunnels.iter_mut() {
            if def.name != *name {
                def.name = name.clone();
            }
        }

        Ok(tunnels)
    }

    fn save(&self, tunnels: &BTreeMap<String, TunnelDefinition>) -> Result<()> {
        write_json_atomic(&self.path, tunnels)
    }
}
