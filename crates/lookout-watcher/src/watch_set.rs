//! Bounded, insertion-ordered set of watched paths.
//!
//! Eviction is oldest-first. This is a rough stand-in for "least
//! relevant", good enough because a missed notification only delays a
//! refresh that will happen anyway.

use crate::source::NotificationSource;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Paths currently subscribed with a notification source.
///
/// `add` doesn't enforce the capacity on its own; callers check
/// [`is_full`](WatchSet::is_full) and evict first.
#[derive(Debug)]
pub struct WatchSet<S> {
    source: S,
    paths: VecDeque<PathBuf>,
    capacity: usize,
}

impl<S: NotificationSource> WatchSet<S> {
    /// Creates an empty set that will hold at most `capacity` paths.
    pub fn new(source: S, capacity: usize) -> Self {
        Self {
            source,
            paths: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Subscribes `path` and records it as watched.
    ///
    /// The path is recorded even if the subscribe call fails. Retrying on
    /// every refresh would just hammer the backend with the same error.
    pub fn add(&mut self, path: PathBuf) {
        if let Err(e) = self.source.subscribe(&path) {
            warn!("Failed to watch {}: {}", path.display(), e);
        }
        self.paths.push_back(path);
    }

    /// Drops the longest-watched path and unsubscribes it.
    ///
    /// Returns `None` if nothing is watched. The entry is gone from the
    /// set even when the unsubscribe call fails.
    pub fn evict_oldest(&mut self) -> Option<PathBuf> {
        let oldest = self.paths.pop_front()?;
        debug!("Evicting {}", oldest.display());
        if let Err(e) = self.source.unsubscribe(&oldest) {
            warn!("Failed to unwatch {}: {}", oldest.display(), e);
        }
        Some(oldest)
    }
}

impl<S> WatchSet<S> {
    /// Linear scan; the set is small.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn is_full(&self) -> bool {
        self.paths.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Watched paths, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}
