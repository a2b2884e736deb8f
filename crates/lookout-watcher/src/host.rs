//! What the watcher needs from the application that embeds it.

/// A file the host application is interested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    /// Path relative to the working directory.
    pub name: String,

    /// The file is gone from disk; there is nothing to watch.
    pub deleted: bool,
}

impl TrackedFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deleted: false,
        }
    }

    pub fn deleted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deleted: true,
        }
    }
}

/// Refresh entry point of the host application.
///
/// Both methods are called from the event loop task, so they must be
/// cheap and must not block.
pub trait RefreshHost: Send + Sync + 'static {
    /// Whether a file-list refresh is currently running.
    ///
    /// Read without any locking; a stale answer at worst causes one
    /// redundant refresh.
    fn is_refreshing_files(&self) -> bool;

    /// Starts an asynchronous refresh of the file list and returns
    /// without waiting for it.
    fn refresh_files(&self);
}
