//! The CLI's side of the refresh handshake.

use lookout_watcher::RefreshHost;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Forwards refresh requests to the main loop.
///
/// The flag goes up when a request is sent and comes down once the main
/// loop has finished the rescan, so bursts of changes collapse into one
/// refresh.
pub struct CliHost {
    refreshing: AtomicBool,
    requests: UnboundedSender<()>,
}

impl CliHost {
    pub fn new(requests: UnboundedSender<()>) -> Self {
        Self {
            refreshing: AtomicBool::new(false),
            requests,
        }
    }

    /// Marks a refresh as started outside the watcher (e.g. the first scan).
    pub fn begin_refresh(&self) {
        self.refreshing.store(true, Ordering::Release);
    }

    pub fn finish_refresh(&self) {
        self.refreshing.store(false, Ordering::Release);
    }
}

impl RefreshHost for CliHost {
    fn is_refreshing_files(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    fn refresh_files(&self) {
        self.begin_refresh();
        if self.requests.send(()).is_err() {
            warn!("Refresh requested after shutdown");
            self.finish_refresh();
        }
    }
}
