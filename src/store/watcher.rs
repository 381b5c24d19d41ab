//! Workbook file watcher for hot reload.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::store::WorkbookStore;

/// Reloads a file-backed [`WorkbookStore`] when the file changes on disk.
pub struct WorkbookWatcher {
    path: PathBuf,
    store: Arc<WorkbookStore>,
}

impl WorkbookWatcher {
    /// Returns `None` for stores without a backing file.
    pub fn new(store: Arc<WorkbookStore>) -> Option<Self> {
        let path = store.path()?.to_path_buf();
        Some(Self { path, store })
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let store = self.store.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touches_file = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == path.file_name());
                    if touches_file && (event.kind.is_modify() || event.kind.is_create()) {
                        tracing::info!(path = %path.display(), "Workbook file changed, reloading");
                        if let Err(e) = store.reload() {
                            tracing::error!(error = %e, "Failed to reload workbook, keeping current data");
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Workbook watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        // Watch the directory so atomic renames over the file are seen.
        let dir = self
            .path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .map(|d| d.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "Workbook watcher started");
        Ok(watcher)
    }
}
