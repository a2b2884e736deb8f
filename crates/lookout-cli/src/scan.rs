//! Directory scanning.
//!
//! Produces the tracked-file list handed to the watcher on every refresh.

use ignore::WalkBuilder;
use lookout_watcher::TrackedFile;
use std::collections::HashSet;
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

/// Lists files under `root` as paths relative to it, most recently
/// modified first. Respects .gitignore and skips hidden files.
pub fn scan_files(root: &Path) -> Vec<String> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        // .gitignore applies even outside a git repository
        .require_git(false)
        .build();

    let mut files: Vec<(SystemTime, String)> = Vec::new();
    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };

        let modified = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        files.push((modified, relative.to_string_lossy().into_owned()));
    }

    files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    debug!("Scanned {} files under {}", files.len(), root.display());

    files.into_iter().map(|(_, name)| name).collect()
}

/// Builds the tracked list from a fresh scan, appending files that were
/// present last time but are now gone as deleted entries.
pub fn diff_tracked(previous: &[String], current: &[String]) -> Vec<TrackedFile> {
    let present: HashSet<&str> = current.iter().map(String::as_str).collect();

    let mut tracked: Vec<TrackedFile> = current.iter().map(TrackedFile::new).collect();
    tracked.extend(
        previous
            .iter()
            .filter(|name| !present.contains(name.as_str()))
            .map(TrackedFile::deleted),
    );
    tracked
}
