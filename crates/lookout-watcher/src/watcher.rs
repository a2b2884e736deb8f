//! File watcher for refresh triggering.
//!
//! Keeps a bounded set of the host's tracked files subscribed with a
//! notification source, and runs the event loop that turns changes
//! into refresh requests.

use crate::error::{Result, WatchError};
use crate::event_loop;
use crate::host::{RefreshHost, TrackedFile};
use crate::source::{NotificationSource, NotifySource, SourceStreams};
use crate::watch_set::WatchSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

type BaseDirResolver = Box<dyn Fn() -> std::io::Result<PathBuf> + Send + Sync>;

/// Whether the watcher is doing anything at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Active,
    /// The notification backend couldn't start. Permanent.
    Disabled,
}

/// Watches up to `max_watched_files` of the host's files.
pub struct FileWatcher<S = NotifySource> {
    /// `None` when disabled.
    watch_set: Option<WatchSet<S>>,
    /// Taken by [`start`](FileWatcher::start).
    streams: Option<SourceStreams>,
    max_watched_files: usize,
    base_dir: BaseDirResolver,
}

impl FileWatcher<NotifySource> {
    /// Creates a watcher backed by the platform's notify watcher.
    ///
    /// Never fails: if notify can't be initialized the error is logged
    /// and the watcher comes back disabled.
    pub fn new(max_watched_files: usize) -> Self {
        Self::from_init(NotifySource::new(), max_watched_files)
    }
}

impl<S: NotificationSource> FileWatcher<S> {
    /// Creates a watcher from the result of initializing a source.
    pub fn from_init(init: Result<(S, SourceStreams)>, max_watched_files: usize) -> Self {
        let (watch_set, streams) = match init {
            Ok((source, streams)) => {
                info!("File watching enabled (max {} files)", max_watched_files);
                (Some(WatchSet::new(source, max_watched_files)), Some(streams))
            }
            Err(e) => {
                error!("File watching disabled: {}", e);
                (None, None)
            }
        };

        Self {
            watch_set,
            streams,
            max_watched_files,
            base_dir: Box::new(std::env::current_dir),
        }
    }

    /// Overrides how the base directory for tracked file names is found.
    /// Defaults to the process's current directory.
    pub fn with_base_dir<F>(mut self, resolver: F) -> Self
    where
        F: Fn() -> std::io::Result<PathBuf> + Send + Sync + 'static,
    {
        self.base_dir = Box::new(resolver);
        self
    }

    pub fn state(&self) -> WatcherState {
        if self.watch_set.is_some() {
            WatcherState::Active
        } else {
            WatcherState::Disabled
        }
    }

    pub fn max_watched_files(&self) -> usize {
        self.max_watched_files
    }

    /// The currently watched paths, or `None` when disabled.
    pub fn watched(&self) -> Option<&WatchSet<S>> {
        self.watch_set.as_ref()
    }

    /// Brings the watched set in line with the host's tracked files.
    ///
    /// At most `max_watched_files` entries of `files` are looked at, in
    /// the order given. Files already watched keep their place in the
    /// eviction queue; new ones push out the oldest watch once the set is
    /// full. Only a failure to resolve the base directory is returned;
    /// subscribe errors are logged and otherwise ignored.
    ///
    /// Calls must not overlap; the host serializes them.
    pub fn reconcile(&mut self, files: &[TrackedFile]) -> Result<()> {
        let Some(watch_set) = self.watch_set.as_mut() else {
            return Ok(());
        };
        if files.is_empty() {
            return Ok(());
        }

        let base_dir = (self.base_dir)().map_err(WatchError::base_dir)?;

        let mut added = 0;
        for file in files.iter().take(self.max_watched_files) {
            if file.deleted {
                continue;
            }

            let path = base_dir.join(&file.name);
            if watch_set.contains(&path) {
                continue;
            }

            while watch_set.is_full() {
                if watch_set.evict_oldest().is_none() {
                    break;
                }
            }

            watch_set.add(path);
            added += 1;
        }

        debug!(
            "Reconciled {} tracked files: {} new watches, {} total",
            files.len(),
            added,
            watch_set.len()
        );

        Ok(())
    }

    /// Spawns the event loop on the current tokio runtime.
    ///
    /// Returns `None` if the watcher is disabled or the loop was already
    /// started. The loop runs until `cancel` fires or the source goes
    /// away.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start<H: RefreshHost>(
        &mut self,
        host: Arc<H>,
        cancel: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        self.watch_set.as_ref()?;
        let streams = self.streams.take()?;
        Some(tokio::spawn(event_loop::run(streams, host, cancel)))
    }
}

impl<S> std::fmt::Debug for FileWatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("active", &self.watch_set.is_some())
            .field(
                "watched",
                &self.watch_set.as_ref().map(|s| s.len()).unwrap_or(0),
            )
            .field("max_watched_files", &self.max_watched_files)
            .field("started", &self.streams.is_none())
            .finish()
    }
}
