//! Test doubles shared by the unit tests.

use crate::error::{Result, WatchError};
use crate::host::RefreshHost;
use crate::source::NotificationSource;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Subscribe(PathBuf),
    Unsubscribe(PathBuf),
}

/// Records every call; optionally fails them all.
#[derive(Debug, Clone, Default)]
pub struct RecordingSource {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub fail: bool,
}

impl RecordingSource {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn subscribes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Subscribe(_)))
            .count()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            Err(WatchError::Source("simulated failure".into()))
        } else {
            Ok(())
        }
    }
}

impl NotificationSource for RecordingSource {
    fn subscribe(&mut self, path: &Path) -> Result<()> {
        self.record(Call::Subscribe(path.to_path_buf()))
    }

    fn unsubscribe(&mut self, path: &Path) -> Result<()> {
        self.record(Call::Unsubscribe(path.to_path_buf()))
    }
}

/// Host that counts refresh requests.
#[derive(Debug, Default)]
pub struct CountingHost {
    pub refreshing: AtomicBool,
    pub refreshes: AtomicUsize,
}

impl CountingHost {
    pub fn busy() -> Self {
        Self {
            refreshing: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl RefreshHost for CountingHost {
    fn is_refreshing_files(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    fn refresh_files(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}
