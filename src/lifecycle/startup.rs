//! Startup orchestration: open the configured store and build the catalog.
//!
//! # Design Decisions
//! - Fail fast: a store that cannot be opened is fatal
//! - The Sheets token comes from config or `GARDEN_SHEETS_TOKEN`

use std::path::Path;
use std::sync::Arc;

use notify::RecommendedWatcher;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::garden::Catalog;
use crate::store::{SheetStore, SheetsStore, StoreError, WorkbookStore, WorkbookWatcher};

/// Environment variable consulted when no access token is configured.
pub const SHEETS_TOKEN_ENV: &str = "GARDEN_SHEETS_TOKEN";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to watch workbook: {0}")]
    Watch(#[from] notify::Error),
}

/// The opened catalog plus anything that must stay alive with it.
pub struct Started {
    pub catalog: Arc<Catalog>,
    /// Held for hot reload; dropping it stops the watcher.
    pub watcher: Option<RecommendedWatcher>,
}

/// Open the configured backend.
pub fn open_catalog(config: &StoreConfig) -> Result<Started, StartupError> {
    match config.backend {
        StoreBackend::Workbook => {
            let store = Arc::new(WorkbookStore::open(Path::new(&config.workbook_path))?);
            tracing::info!(path = %config.workbook_path, watch = config.watch, "Workbook store opened");

            let watcher = match config.watch.then(|| WorkbookWatcher::new(store.clone())).flatten() {
                Some(watcher) => Some(watcher.run()?),
                None => None,
            };
            let store: Arc<dyn SheetStore> = store;
            Ok(Started {
                catalog: Arc::new(Catalog::new(store)),
                watcher,
            })
        }
        StoreBackend::Sheets => {
            let token = config
                .sheets
                .access_token
                .clone()
                .filter(|t| !t.trim().is_empty())
                .or_else(|| std::env::var(SHEETS_TOKEN_ENV).ok())
                .ok_or_else(|| {
                    StoreError::NotConfigured(format!(
                        "no access token in config or {}",
                        SHEETS_TOKEN_ENV
                    ))
                })?;
            let store: Arc<dyn SheetStore> = Arc::new(SheetsStore::new(&config.sheets, token)?);
            Ok(Started {
                catalog: Arc::new(Catalog::new(store)),
                watcher: None,
            })
        }
    }
}
