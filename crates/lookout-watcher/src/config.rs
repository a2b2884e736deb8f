//! Watcher configuration.
//!
//! Stored as JSON, e.g. `.lookout/config.json`:
//!
//! ```json
//! { "maxWatchedFiles": 10 }
//! ```

use crate::error::{Result, WatchError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default cap on watched files.
///
/// Some platforms (macOS in particular) allow very few open watch
/// handles per process, and there is no portable way to ask how many
/// are left, so the default stays small.
pub const DEFAULT_MAX_WATCHED_FILES: usize = 10;

/// Directory holding per-project settings.
pub const CONFIG_DIR: &str = ".lookout";

/// Name of the config file inside [`CONFIG_DIR`] or the user config dir.
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatcherConfig {
    /// Upper bound on simultaneously watched files.
    pub max_watched_files: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            max_watched_files: DEFAULT_MAX_WATCHED_FILES,
        }
    }
}

impl WatcherConfig {
    /// Reads a config file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| WatchError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| WatchError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the first config found among `candidates`, or the default
    /// if none of them exist.
    pub fn discover<I>(candidates: I) -> Result<Self>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for path in candidates {
            if path.is_file() {
                debug!("Loading config from {}", path.display());
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    /// Location of the project-level config under `root`.
    pub fn project_path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Writes the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| WatchError::Config {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| WatchError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }
}
