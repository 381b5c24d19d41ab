//! Local workbook store.
//!
//! Holds the workbook in memory and, when opened from a file, writes every
//! change back as JSON. The file layout mirrors the Sheets values API: one
//! array of rows per sheet, header first.
//!
//! ```json
//! { "Plants": [["Plant ID", "Plant Name"], ["1", "Tomato"]], "Locations": [], "Containers": [] }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde_json::Value;

use crate::model::Table;
use crate::store::{Sheet, SheetStore, StoreError, StoreResult, Workbook};

/// In-memory workbook, optionally persisted to a JSON file.
#[derive(Debug)]
pub struct WorkbookStore {
    path: Option<PathBuf>,
    workbook: ArcSwap<Workbook>,
    writes: Mutex<()>,
}

impl WorkbookStore {
    /// A store that lives only in memory.
    pub fn in_memory(workbook: Workbook) -> Self {
        Self {
            path: None,
            workbook: ArcSwap::from_pointee(workbook),
            writes: Mutex::new(()),
        }
    }

    /// Open a workbook file. A missing file starts an empty workbook that
    /// is created on the first write.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let workbook = if path.exists() {
            read_file(path)?
        } else {
            tracing::info!(path = %path.display(), "Workbook file not found, starting empty");
            Workbook::default()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            workbook: ArcSwap::from_pointee(workbook),
            writes: Mutex::new(()),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Re-read the backing file, replacing the in-memory snapshot.
    pub fn reload(&self) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let workbook = read_file(path)?;
        let _guard = self.writes.lock().expect("workbook write mutex poisoned");
        self.workbook.store(Arc::new(workbook));
        tracing::info!(path = %path.display(), "Workbook reloaded");
        Ok(())
    }

    fn modify(
        &self,
        table: Table,
        change: impl FnOnce(&mut Sheet) -> StoreResult<()>,
    ) -> StoreResult<()> {
        let _guard = self.writes.lock().expect("workbook write mutex poisoned");
        let mut next = Workbook::clone(&self.workbook.load());
        change(next.sheet_mut(table))?;
        if let Some(path) = &self.path {
            write_file(path, &next)?;
        }
        self.workbook.store(Arc::new(next));
        Ok(())
    }
}

#[async_trait]
impl SheetStore for WorkbookStore {
    async fn read_workbook(&self) -> StoreResult<Arc<Workbook>> {
        Ok(self.workbook.load_full())
    }

    async fn append_row(&self, table: Table, row: Vec<String>) -> StoreResult<()> {
        self.modify(table, |sheet| {
            sheet.rows.push(row);
            Ok(())
        })
    }

    async fn update_row(&self, table: Table, index: usize, row: Vec<String>) -> StoreResult<()> {
        self.modify(table, |sheet| match sheet.rows.get_mut(index) {
            Some(slot) => {
                *slot = row;
                Ok(())
            }
            None => Err(StoreError::RowOutOfRange { table, index }),
        })
    }
}

fn read_file(path: &Path) -> StoreResult<Workbook> {
    let content = fs::read_to_string(path)?;
    parse_workbook(&content)
}

/// Parse workbook JSON. Missing sheets start empty.
pub fn parse_workbook(content: &str) -> StoreResult<Workbook> {
    let mut grids: HashMap<String, Vec<Vec<Value>>> =
        serde_json::from_str(content).map_err(|e| StoreError::Parse(e.to_string()))?;
    let mut sheet = |table: Table| {
        Sheet::from_values(table, grids.remove(table.sheet_name()).unwrap_or_default())
    };
    Ok(Workbook {
        plants: sheet(Table::Plants),
        locations: sheet(Table::Locations),
        containers: sheet(Table::Containers),
    })
}

fn write_file(path: &Path, workbook: &Workbook) -> StoreResult<()> {
    let grids: HashMap<&str, Vec<Vec<String>>> = Table::ALL
        .into_iter()
        .map(|t| (t.sheet_name(), workbook.sheet(t).to_values()))
        .collect();
    let json = serde_json::to_string_pretty(&grids).map_err(|e| StoreError::Parse(e.to_string()))?;

    // Write beside the target, then rename over it.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_append_and_update_persist_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garden.json");

        let store = WorkbookStore::open(&path).unwrap();
        store.append_row(Table::Plants, row(&["1", "Tomato"])).await.unwrap();
        store.update_row(Table::Plants, 0, row(&["1", "Cherry Tomato"])).await.unwrap();

        let reopened = WorkbookStore::open(&path).unwrap();
        let workbook = reopened.read_workbook().await.unwrap();
        assert_eq!(workbook.plants.header, Table::Plants.default_header());
        assert_eq!(workbook.plants.rows, vec![row(&["1", "Cherry Tomato"])]);
    }

    #[tokio::test]
    async fn test_update_out_of_range() {
        let store = WorkbookStore::in_memory(Workbook::default());
        let err = store
            .update_row(Table::Locations, 3, row(&["9"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::RowOutOfRange { index: 3, .. }));
    }

    #[test]
    fn test_parse_workbook_rejects_bad_json() {
        assert!(matches!(parse_workbook("{not json"), Err(StoreError::Parse(_))));

        let workbook = parse_workbook(r#"{"Plants": [["Plant ID"], ["1"]]}"#).unwrap();
        assert_eq!(workbook.plants.rows.len(), 1);
        assert_eq!(workbook.containers.header, Table::Containers.default_header());
    }
}
