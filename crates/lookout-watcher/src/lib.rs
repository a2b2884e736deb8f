//! Lookout Watcher - bounded file watching for refresh triggering
//!
//! This crate keeps an application's view of a working directory fresh:
//! - Watching a capped set of the files the application cares about
//! - Evicting the oldest watch when the cap is reached
//! - Turning change notifications into a single "refresh" request
//!
//! Watching is a latency optimization. Every failure degrades to "no
//! automatic refresh" rather than an error the application has to handle.
//!
//! # Example
//!
//! ```no_run
//! use lookout_watcher::{FileWatcher, RefreshHost, TrackedFile};
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! struct App {
//!     refreshing: AtomicBool,
//! }
//!
//! impl RefreshHost for App {
//!     fn is_refreshing_files(&self) -> bool {
//!         self.refreshing.load(Ordering::Relaxed)
//!     }
//!
//!     fn refresh_files(&self) {
//!         // kick off a rescan
//!     }
//! }
//!
//! # async fn demo() -> lookout_watcher::Result<()> {
//! let mut watcher = FileWatcher::new(10);
//! let app = Arc::new(App { refreshing: AtomicBool::new(false) });
//! watcher.start(app, CancellationToken::new());
//! watcher.reconcile(&[TrackedFile::new("src/main.rs")])?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
mod event_loop;
mod host;
pub mod source;
mod watch_set;
mod watcher;

#[cfg(test)]
mod testing;

pub use config::WatcherConfig;
pub use error::{Result, WatchError};
pub use host::{RefreshHost, TrackedFile};
pub use source::{ChangeEvent, ChangeKind, NotificationSource, NotifySource, SourceStreams};
pub use watch_set::WatchSet;
pub use watcher::{FileWatcher, WatcherState};
