//! Google Sheets store.
//!
//! # Responsibilities
//! - Fetch all three sheets in one `values:batchGet` call
//! - Append rows via `values/{range}:append`
//! - Overwrite a single row via `values/{range}` PUT
//! - Cache the fetched workbook for a short TTL
//!
//! # Design Decisions
//! - Authenticates with a bearer access token; minting it is left to the
//!   deployment (service account tooling, `gcloud auth print-access-token`)
//! - Any write invalidates the cache so the next read sees it
//! - A sheet with a blank first row gets the standard header written
//!   before its first append, so data never lands in the header row
//! - Failures surface as `StoreError`, no retry

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::SheetsConfig;
use crate::model::Table;
use crate::store::{cell_text, Sheet, SheetStore, StoreError, StoreResult, Workbook};

#[derive(Debug)]
struct CachedWorkbook {
    workbook: Arc<Workbook>,
    fetched_at: Instant,
}

/// Store backed by a hosted Google spreadsheet.
#[derive(Debug)]
pub struct SheetsStore {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
    cache_ttl: Duration,
    cache: ArcSwapOption<CachedWorkbook>,
}

#[derive(Debug, Deserialize)]
struct BatchGetResponse {
    #[serde(default, rename = "valueRanges")]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    range: String,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsStore {
    /// Create a store for the configured spreadsheet.
    pub fn new(config: &SheetsConfig, access_token: String) -> StoreResult<Self> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(StoreError::NotConfigured("spreadsheet_id is empty".into()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::info!(
            spreadsheet_id = %config.spreadsheet_id,
            cache_ttl_secs = config.cache_ttl_secs,
            "Sheets store initialized"
        );

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            access_token,
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            cache: ArcSwapOption::empty(),
        })
    }

    fn values_url(&self, suffix: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values{}",
            self.api_base, self.spreadsheet_id, suffix
        )
    }

    async fn fetch(&self) -> StoreResult<Workbook> {
        let ranges: Vec<(&str, &str)> = Table::ALL
            .iter()
            .map(|t| ("ranges", t.sheet_name()))
            .collect();
        let response = self
            .client
            .get(self.values_url(":batchGet"))
            .bearer_auth(&self.access_token)
            .query(&ranges)
            .send()
            .await?;
        let body: BatchGetResponse = check(response).await?.json().await?;

        let mut workbook = Workbook::default();
        for range in body.value_ranges {
            // Ranges come back as "Plants!A1:Z100" or "'Plants'!A1:Z100".
            let name = range.range.split('!').next().unwrap_or("").trim_matches('\'');
            match Table::ALL.into_iter().find(|t| t.sheet_name() == name) {
                Some(table) => *workbook.sheet_mut(table) = Sheet::from_values(table, range.values),
                None => tracing::warn!(range = %range.range, "Ignoring unexpected sheet range"),
            }
        }
        Ok(workbook)
    }

    /// The sheet's first row, empty when the row is blank or missing.
    async fn header_row(&self, table: Table) -> StoreResult<Vec<String>> {
        let response = self
            .client
            .get(self.values_url(&format!("/{}!1:1", table.sheet_name())))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let range: ValueRange = check(response).await?.json().await?;
        let header = range.values.into_iter().next().unwrap_or_default();
        Ok(header.into_iter().map(cell_text).collect())
    }

    async fn write_header(&self, table: Table) -> StoreResult<()> {
        let range = format!("{}!A1", table.sheet_name());
        let response = self
            .client
            .put(self.values_url(&format!("/{}", range)))
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "values": [table.default_header()] }))
            .send()
            .await?;
        check(response).await?;
        tracing::info!(table = %table, "Wrote header row to blank sheet");
        Ok(())
    }

    fn invalidate(&self) {
        self.cache.store(None);
    }
}

#[async_trait]
impl SheetStore for SheetsStore {
    async fn read_workbook(&self) -> StoreResult<Arc<Workbook>> {
        if let Some(cached) = self.cache.load_full() {
            if cached.fetched_at.elapsed() < self.cache_ttl {
                return Ok(cached.workbook.clone());
            }
        }

        let started = Instant::now();
        let workbook = Arc::new(self.fetch().await?);
        tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Fetched workbook from Sheets");

        self.cache.store(Some(Arc::new(CachedWorkbook {
            workbook: workbook.clone(),
            fetched_at: Instant::now(),
        })));
        Ok(workbook)
    }

    async fn append_row(&self, table: Table, row: Vec<String>) -> StoreResult<()> {
        if self.header_row(table).await?.iter().all(|c| c.trim().is_empty()) {
            self.write_header(table).await?;
        }
        let url = self.values_url(&format!("/{}!A1:append", table.sheet_name()));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        check(response).await?;
        self.invalidate();
        tracing::info!(table = %table, "Appended row to sheet");
        Ok(())
    }

    async fn update_row(&self, table: Table, index: usize, row: Vec<String>) -> StoreResult<()> {
        // Data row 0 sits on sheet row 2, under the header.
        let range = format!("{}!A{}", table.sheet_name(), index + 2);
        let response = self
            .client
            .put(self.values_url(&format!("/{}", range)))
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "range": range, "values": [row] }))
            .send()
            .await?;
        check(response).await?;
        self.invalidate();
        tracing::info!(table = %table, row = index, "Updated sheet row");
        Ok(())
    }
}

async fn check(response: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    tracing::error!(status = %status, "Sheets API request failed");
    Err(StoreError::Upstream {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use axum::{
        extract::{Path, Query, State},
        routing::get,
        Json, Router,
    };

    use crate::garden::{Catalog, PlantInput};

    type Grids = Arc<Mutex<HashMap<String, Vec<Vec<String>>>>>;

    /// Minimal stand-in for the Sheets values API over in-memory grids.
    async fn spawn_values_api(grids: Grids) -> String {
        async fn batch_get(
            State(grids): State<Grids>,
            Query(params): Query<Vec<(String, String)>>,
        ) -> Json<Value> {
            let grids = grids.lock().unwrap();
            let ranges: Vec<Value> = params
                .iter()
                .filter(|(k, _)| k == "ranges")
                .map(|(_, name)| {
                    let values = grids.get(name).cloned().unwrap_or_default();
                    json!({ "range": format!("'{}'!A1:Z1000", name), "values": values })
                })
                .collect();
            Json(json!({ "valueRanges": ranges }))
        }

        async fn read_range(
            State(grids): State<Grids>,
            Path((_, range)): Path<(String, String)>,
        ) -> Json<Value> {
            let name = range.split('!').next().unwrap_or_default();
            let grids = grids.lock().unwrap();
            let first: Vec<Vec<String>> = grids
                .get(name)
                .and_then(|g| g.first().cloned())
                .filter(|row| !row.is_empty())
                .into_iter()
                .collect();
            Json(json!({ "range": range, "values": first }))
        }

        async fn write_range(
            State(grids): State<Grids>,
            Path((_, range)): Path<(String, String)>,
            Json(body): Json<Value>,
        ) -> Json<Value> {
            let (name, cell) = range.split_once('!').unwrap();
            let line: usize = cell.trim_start_matches('A').parse().unwrap();
            let row: Vec<String> = serde_json::from_value(body["values"][0].clone()).unwrap();
            let mut grids = grids.lock().unwrap();
            let grid = grids.entry(name.to_string()).or_default();
            if grid.len() < line {
                grid.resize(line, Vec::new());
            }
            grid[line - 1] = row;
            Json(json!({}))
        }

        // Appends go under the last non-blank row, as the real API does.
        async fn append(
            State(grids): State<Grids>,
            Path((_, range)): Path<(String, String)>,
            Json(body): Json<Value>,
        ) -> Json<Value> {
            let name = range.split('!').next().unwrap_or_default();
            let rows: Vec<Vec<String>> = serde_json::from_value(body["values"].clone()).unwrap();
            let mut grids = grids.lock().unwrap();
            let grid = grids.entry(name.to_string()).or_default();
            let end = grid
                .iter()
                .rposition(|r| r.iter().any(|c| !c.is_empty()))
                .map_or(0, |i| i + 1);
            grid.truncate(end);
            grid.extend(rows);
            Json(json!({}))
        }

        let app = Router::new()
            .route("/spreadsheets/{id}/values:batchGet", get(batch_get))
            .route(
                "/spreadsheets/{id}/values/{range}",
                get(read_range).put(write_range).post(append),
            )
            .with_state(grids);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn store_at(api_base: String) -> SheetsStore {
        let config = SheetsConfig {
            spreadsheet_id: "garden".into(),
            api_base,
            cache_ttl_secs: 0,
            ..Default::default()
        };
        SheetsStore::new(&config, "token".into()).unwrap()
    }

    #[tokio::test]
    async fn test_first_append_to_blank_sheet_writes_header() {
        let grids: Grids = Arc::default();
        let base = spawn_values_api(grids.clone()).await;
        let catalog = Catalog::new(Arc::new(store_at(base)));

        for name in ["Sage", "Thyme"] {
            catalog
                .create_plant(PlantInput {
                    plant_name: Some(name.into()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let garden = catalog.garden().await.unwrap();
        let names: Vec<&str> = garden.plants.iter().map(|p| p.plant_name.as_str()).collect();
        assert_eq!(names, vec!["Sage", "Thyme"]);
        assert_eq!(garden.plants[1].plant_id, "2");

        let grids = grids.lock().unwrap();
        let plants = &grids["Plants"];
        assert_eq!(plants[0], Table::Plants.default_header());
        assert_eq!(plants.len(), 3);
    }

    #[tokio::test]
    async fn test_blank_header_row_is_filled_in_place() {
        let grids: Grids = Arc::default();
        let mut data = vec![String::new(); Table::Plants.default_header().len()];
        data[0] = "4".into();
        data[1] = "Chives".into();
        grids
            .lock()
            .unwrap()
            .insert("Plants".into(), vec![Vec::new(), data]);
        let base = spawn_values_api(grids.clone()).await;
        let store = store_at(base);

        let workbook = store.read_workbook().await.unwrap();
        assert_eq!(workbook.plants.rows.len(), 1);

        let catalog = Catalog::new(Arc::new(store));
        let sage = catalog
            .create_plant(PlantInput {
                plant_name: Some("Sage".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(sage.plant_id, "5");

        let garden = catalog.garden().await.unwrap();
        let names: Vec<&str> = garden.plants.iter().map(|p| p.plant_name.as_str()).collect();
        assert_eq!(names, vec!["Chives", "Sage"]);
    }

    #[test]
    fn test_requires_spreadsheet_id() {
        let config = SheetsConfig::default();
        let err = SheetsStore::new(&config, "token".into()).unwrap_err();
        assert!(matches!(err, StoreError::NotConfigured(_)));
    }

    #[test]
    fn test_values_url() {
        let config = SheetsConfig {
            spreadsheet_id: "abc123".into(),
            api_base: "https://sheets.example/v4/".into(),
            ..Default::default()
        };
        let store = SheetsStore::new(&config, "token".into()).unwrap();
        assert_eq!(
            store.values_url(":batchGet"),
            "https://sheets.example/v4/spreadsheets/abc123/values:batchGet"
        );
    }
}
