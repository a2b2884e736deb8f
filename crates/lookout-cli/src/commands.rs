//! CLI command implementations.

use crate::host::CliHost;
use crate::scan::{diff_tracked, scan_files};
use colored::Colorize;
use lookout_watcher::config::CONFIG_FILE;
use lookout_watcher::{FileWatcher, WatcherConfig, WatcherState};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Write a default config into `<path>/.lookout/config.json`.
pub fn init(path: &Path) -> Result<()> {
    let config_path = WatcherConfig::project_path(path);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    WatcherConfig::default().save(&config_path)?;

    println!("{} Initialized Lookout in {}", "✓".green(), path.display());
    println!("  Run {} to start watching", "lookout watch".cyan());

    Ok(())
}

/// Watch `path` until Ctrl-C, reprinting the file list on every refresh.
pub async fn watch(path: &Path, max_override: Option<usize>) -> Result<()> {
    // The watcher resolves tracked names against the working directory
    std::env::set_current_dir(path)?;
    let root = std::env::current_dir()?;

    let config = load_config(&root, max_override)?;
    let mut watcher = FileWatcher::new(config.max_watched_files);

    let (requests_tx, mut requests_rx) = unbounded_channel();
    let host = Arc::new(CliHost::new(requests_tx));
    let cancel = CancellationToken::new();
    let event_loop = watcher.start(host.clone(), cancel.clone());

    if watcher.state() == WatcherState::Disabled {
        eprintln!(
            "{} File watching unavailable, showing a single snapshot",
            "⚠".yellow()
        );
    } else {
        println!(
            "{} Watching {} (up to {} files, Ctrl-C to stop)",
            "✓".green(),
            root.display(),
            config.max_watched_files
        );
    }

    let mut previous = Vec::new();
    host.begin_refresh();
    refresh(&root, &mut watcher, &mut previous).await?;
    host.finish_refresh();

    if event_loop.is_some() {
        refresh_loop(
            tokio::signal::ctrl_c(),
            &mut requests_rx,
            &host,
            &root,
            &mut watcher,
            &mut previous,
        )
        .await?;
    }

    cancel.cancel();
    if let Some(handle) = event_loop {
        handle.await?;
    }
    info!("Stopped watching {}", root.display());

    Ok(())
}

/// Serves refresh requests until `shutdown` completes.
///
/// `shutdown` is polled as one pinned future for the whole loop, so a
/// signal that lands mid-refresh is still seen afterwards.
async fn refresh_loop<F: Future>(
    shutdown: F,
    requests: &mut UnboundedReceiver<()>,
    host: &CliHost,
    root: &Path,
    watcher: &mut FileWatcher,
    previous: &mut Vec<String>,
) -> Result<()> {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => return Ok(()),
            Some(()) = requests.recv() => {
                let outcome = refresh(root, watcher, previous).await;
                host.finish_refresh();
                outcome?;
            }
        }
    }
}

/// Flag, then project config, then user config, then the default.
fn load_config(root: &Path, max_override: Option<usize>) -> Result<WatcherConfig> {
    let mut candidates = vec![WatcherConfig::project_path(root)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("lookout").join(CONFIG_FILE));
    }

    let mut config = WatcherConfig::discover(candidates)?;
    if let Some(max) = max_override {
        config.max_watched_files = max;
    }
    Ok(config)
}

/// One refresh cycle: rescan, print, reconcile the watcher.
async fn refresh(
    root: &Path,
    watcher: &mut FileWatcher,
    previous: &mut Vec<String>,
) -> Result<()> {
    let scan_root: PathBuf = root.to_path_buf();
    let current = tokio::task::spawn_blocking(move || scan_files(&scan_root)).await?;

    let tracked = diff_tracked(previous, &current);
    let deleted = tracked.iter().filter(|f| f.deleted).count();

    // A failed reconcile only costs us timely refreshes
    if let Err(e) = watcher.reconcile(&tracked) {
        warn!("Could not update watched files: {}", e);
    }

    let watched = watcher.watched().map(|w| w.len()).unwrap_or(0);
    let deleted_msg = if deleted > 0 {
        format!(" ({} deleted)", deleted)
    } else {
        String::new()
    };
    println!(
        "{} {} files{}, watching {}",
        "✓".green(),
        current.len().to_string().cyan(),
        deleted_msg.dimmed(),
        watched.to_string().cyan()
    );
    for name in current.iter().take(watcher.max_watched_files()) {
        println!("  {}", name);
    }
    if current.len() > watcher.max_watched_files() {
        println!("  ... and {} more", current.len() - watcher.max_watched_files());
    }

    *previous = current;
    Ok(())
}
