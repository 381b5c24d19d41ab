//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use garden_db::config::GardenConfig;
use garden_db::garden::Catalog;
use garden_db::lifecycle::Shutdown;
use garden_db::store::{Sheet, SheetStore, Workbook, WorkbookStore};
use garden_db::HttpServer;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn sheet(header: &[&str], rows: &[&[&str]]) -> Sheet {
    let cells = |r: &[&str]| r.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    Sheet {
        header: cells(header),
        rows: rows.iter().map(|r| cells(*r)).collect(),
    }
}

/// Fixture garden.
///
/// - Patio (7h, derived), Kitchen Window (2h), Front Yard (9h), North Bed (1h)
/// - Basil sits in two locations; Lavender only reaches Front Yard through
///   its container; Mint points at a location that does not exist.
pub fn fixture_workbook() -> Workbook {
    Workbook {
        plants: sheet(
            &[
                "Plant ID",
                "Plant Name",
                "Description",
                "Location ID",
                "Light Requirements",
                "Watering Needs",
            ],
            &[
                &["1", "Tomato", "Cherry tomato, indeterminate", "1", "Full Sun", "Daily"],
                &["2", "Basil", "Sweet basil", "1, 2", "Full Sun", "Keep moist"],
                &["3", "Rosemary", "Woody herb", "3", "Full Sun", "Weekly"],
                &["4", "Fern", "Shade lover", "4", "Shade", "Keep moist"],
                &["5", "Lavender", "", "", "Full Sun", ""],
                &["6", "Mint", "Spreads aggressively", "99", "", "Daily"],
            ],
        ),
        locations: sheet(
            &[
                "Location ID",
                "Location Name",
                "Morning Sun Hours",
                "Afternoon Sun Hours",
                "Evening Sun Hours",
                "Total Sun Hours",
                "Microclimate Conditions",
            ],
            &[
                &["1", "Patio", "2", "4", "1", "", "sheltered"],
                &["2", "Kitchen Window", "1", "1", "0", "2", ""],
                &["3", "Front Yard", "3", "4", "2", "9", "windy"],
                &["4", "North Bed", "0", "1", "0", "1", "shady"],
            ],
        ),
        containers: sheet(
            &[
                "Container ID",
                "Plant ID",
                "Location ID",
                "Container Type",
                "Container Size",
                "Container Material",
            ],
            &[
                &["1", "1", "1", "Pot", "Large", "Ceramic"],
                &["2", "2", "1", "Pot", "Small", "Plastic"],
                &["3", "2", "2", "Window Box", "Medium", "Plastic"],
                &["4", "3", "3", "Raised Bed", "Large", "Wood"],
                &["5", "5", "3", "Pot", "Medium", "Terracotta"],
                &["6", "6", "99", "Pot", "Small", "Plastic"],
            ],
        ),
    }
}

/// A running server on an ephemeral port, stopped on drop.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
        self.handle.abort();
    }
}

/// Start a server over the fixture workbook.
#[allow(dead_code)]
pub async fn start_server() -> TestServer {
    start_server_with(GardenConfig::default(), fixture_workbook()).await
}

/// Start a server with a custom config and workbook, kept in memory.
pub async fn start_server_with(mut config: GardenConfig, workbook: Workbook) -> TestServer {
    config.listener.bind_address = "127.0.0.1:0".to_string();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let store: Arc<dyn SheetStore> = Arc::new(WorkbookStore::in_memory(workbook));
    let server = HttpServer::new(config, Arc::new(Catalog::new(store)));
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        addr,
        base_url: format!("http://{}", addr),
        shutdown,
        handle,
    }
}
