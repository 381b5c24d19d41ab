//! Spreadsheet-backed storage.
//!
//! # Data Flow
//! ```text
//! catalog read
//!     → SheetStore::read_workbook
//!         → workbook.rs (local JSON workbook, in memory)
//!         → sheets.rs   (Google Sheets values API, cached snapshot)
//!     → Workbook { Plants, Locations, Containers }
//!
//! catalog write
//!     → SheetStore::append_row / update_row
//!     → backing sheet updated, cached snapshot replaced
//! ```
//!
//! # Design Decisions
//! - The store speaks rows of cell text; typing happens in `model`
//! - Row indexes are zero-based and exclude the header row
//! - Snapshots are shared as `Arc<Workbook>` and never mutated in place

pub mod sheets;
pub mod watcher;
pub mod workbook;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::Table;

pub use sheets::SheetsStore;
pub use watcher::WorkbookWatcher;
pub use workbook::WorkbookStore;

/// One worksheet: a header row and the data rows beneath it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// An empty sheet carrying the table's standard header.
    pub fn empty(table: Table) -> Self {
        Self {
            header: table.default_header(),
            rows: Vec::new(),
        }
    }

    /// Build a sheet from a raw value grid whose first row is the header.
    ///
    /// A blank first row reads as the standard header, keeping any data
    /// rows beneath it in standard column order.
    pub fn from_values(table: Table, values: Vec<Vec<Value>>) -> Self {
        let mut grid = values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect::<Vec<_>>());
        match grid.next() {
            Some(header) if !header.iter().all(|c| c.trim().is_empty()) => Self {
                header,
                rows: grid.collect(),
            },
            _ => Self {
                header: table.default_header(),
                rows: grid.collect(),
            },
        }
    }

    /// The sheet as a value grid, header first.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header.clone())
            .chain(self.rows.iter().cloned())
            .collect()
    }
}

/// The three garden sheets.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub plants: Sheet,
    pub locations: Sheet,
    pub containers: Sheet,
}

impl Default for Workbook {
    fn default() -> Self {
        Self {
            plants: Sheet::empty(Table::Plants),
            locations: Sheet::empty(Table::Locations),
            containers: Sheet::empty(Table::Containers),
        }
    }
}

impl Workbook {
    pub fn sheet(&self, table: Table) -> &Sheet {
        match table {
            Table::Plants => &self.plants,
            Table::Locations => &self.locations,
            Table::Containers => &self.containers,
        }
    }

    pub fn sheet_mut(&mut self, table: Table) -> &mut Sheet {
        match table {
            Table::Plants => &mut self.plants,
            Table::Locations => &mut self.locations,
            Table::Containers => &mut self.containers,
        }
    }
}

/// Cell text as the Sheets API would render it.
pub fn cell_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => (if b { "TRUE" } else { "FALSE" }).to_string(),
        other => other.to_string(),
    }
}

/// Errors raised by a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("workbook IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("workbook parse error: {0}")]
    Parse(String),

    #[error("spreadsheet request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("spreadsheet API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("row {index} does not exist in {table}")]
    RowOutOfRange { table: Table, index: usize },

    #[error("store not configured: {0}")]
    NotConfigured(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Row-level access to the garden workbook.
#[async_trait]
pub trait SheetStore: Send + Sync + std::fmt::Debug {
    /// Current snapshot of every sheet.
    async fn read_workbook(&self) -> StoreResult<Arc<Workbook>>;

    /// Append a data row to the end of a sheet.
    async fn append_row(&self, table: Table, row: Vec<String>) -> StoreResult<()>;

    /// Replace the data row at `index`.
    async fn update_row(&self, table: Table, index: usize, row: Vec<String>) -> StoreResult<()>;
}
