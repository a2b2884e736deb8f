//! Notification sources.
//!
//! A source subscribes to individual paths and pushes what it sees into
//! two streams: change events and errors. [`NotifySource`] is the real
//! one, built on the notify crate. Tests plug in their own.

use crate::error::{Result, WatchError};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// What kind of change a source observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Modify,
    Rename,
    Remove,
    /// Permission bits, timestamps, ownership. Backends report these
    /// even when nothing the user cares about changed.
    Metadata,
    Access,
    Other,
}

impl From<&EventKind> for ChangeKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => ChangeKind::Create,
            EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::Metadata,
            EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Rename,
            EventKind::Modify(_) => ChangeKind::Modify,
            EventKind::Remove(_) => ChangeKind::Remove,
            EventKind::Access(_) => ChangeKind::Access,
            EventKind::Any | EventKind::Other => ChangeKind::Other,
        }
    }
}

/// A single change reported by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub paths: Vec<PathBuf>,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            paths: vec![path.into()],
        }
    }

    /// Metadata-only events don't mean the file list changed.
    pub fn is_noise(&self) -> bool {
        self.kind == ChangeKind::Metadata
    }
}

impl From<Event> for ChangeEvent {
    fn from(event: Event) -> Self {
        Self {
            kind: ChangeKind::from(&event.kind),
            paths: event.paths,
        }
    }
}

/// Per-path subscription capability.
///
/// Implementations should not block; both calls happen on the host's
/// refresh path.
pub trait NotificationSource: Send {
    /// Starts watching `path` (non-recursively).
    fn subscribe(&mut self, path: &Path) -> Result<()>;

    /// Stops watching `path`.
    fn unsubscribe(&mut self, path: &Path) -> Result<()>;
}

/// Receiving halves of a source's event and error streams.
#[derive(Debug)]
pub struct SourceStreams {
    pub events: UnboundedReceiver<ChangeEvent>,
    pub errors: UnboundedReceiver<WatchError>,
}

/// Sending halves matching a [`SourceStreams`].
#[derive(Debug, Clone)]
pub struct SourceSender {
    events: UnboundedSender<ChangeEvent>,
    errors: UnboundedSender<WatchError>,
}

impl SourceSender {
    /// Pushes a change event. Returns false once the receiver is gone.
    pub fn send_event(&self, event: ChangeEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Pushes an error. Returns false once the receiver is gone.
    pub fn send_error(&self, error: WatchError) -> bool {
        self.errors.send(error).is_ok()
    }
}

/// Creates a connected sender/streams pair.
pub fn channel() -> (SourceSender, SourceStreams) {
    let (events_tx, events_rx) = unbounded_channel();
    let (errors_tx, errors_rx) = unbounded_channel();
    (
        SourceSender {
            events: events_tx,
            errors: errors_tx,
        },
        SourceStreams {
            events: events_rx,
            errors: errors_rx,
        },
    )
}

/// Source backed by the platform's recommended notify watcher.
pub struct NotifySource {
    watcher: notify::RecommendedWatcher,
}

impl NotifySource {
    /// Initializes the platform watcher.
    ///
    /// This fails when the OS refuses another notification instance
    /// (inotify instance limits, missing permissions, ...).
    pub fn new() -> Result<(Self, SourceStreams)> {
        let (tx, streams) = channel();

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let delivered = match res {
                Ok(event) => tx.send_event(ChangeEvent::from(event)),
                Err(e) => tx.send_error(WatchError::from(e)),
            };
            if !delivered {
                warn!("Dropping watch notification, event loop is gone");
            }
        })?;

        Ok((Self { watcher }, streams))
    }
}

impl NotificationSource for NotifySource {
    fn subscribe(&mut self, path: &Path) -> Result<()> {
        debug!("Watching {}", path.display());
        self.watcher.watch(path, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    fn unsubscribe(&mut self, path: &Path) -> Result<()> {
        debug!("Unwatching {}", path.display());
        self.watcher.unwatch(path)?;
        Ok(())
    }
}

impl std::fmt::Debug for NotifySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifySource").finish_non_exhaustive()
    }
}
