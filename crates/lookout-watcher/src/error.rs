//! Error types for the watcher.
//!
//! Most of these never reach the caller. Watching is a latency
//! optimization, so subscribe and stream failures get logged and
//! absorbed where they happen. Only base-directory resolution
//! (and config loading) is surfaced.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for watcher operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Things that can go wrong while watching files.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The notify backend failed, either at startup or while
    /// adding or removing a watch.
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// The working directory could not be resolved, so tracked file
    /// names cannot be turned into absolute paths.
    #[error("failed to resolve base directory: {source}")]
    BaseDir {
        #[source]
        source: std::io::Error,
    },

    /// Error reported by a notification source that isn't backed by notify.
    #[error("notification source error: {0}")]
    Source(String),

    /// Couldn't read a config file from disk.
    #[error("failed to read config '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file exists but isn't valid JSON for [`WatcherConfig`](crate::WatcherConfig).
    #[error("invalid config '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl WatchError {
    /// Wraps a base-directory lookup failure.
    pub fn base_dir(source: std::io::Error) -> Self {
        Self::BaseDir { source }
    }
}
