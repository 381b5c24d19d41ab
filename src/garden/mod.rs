//! Typed view of the garden and the operations on it.
//!
//! # Data Flow
//! ```text
//! Workbook (cell text)
//!     → Garden::from_workbook (typed, blank rows dropped)
//!     → hierarchy.rs (plant → locations → containers)
//!     → handlers / query engine
//!
//! catalog.rs: create/update records → SheetStore rows
//! ```

pub mod catalog;
pub mod hierarchy;

use crate::model::{ColumnMap, Container, Location, Plant, Record, Table};
use crate::store::Workbook;

pub use catalog::{Catalog, CatalogError, CatalogResult, ContainerInput, LocationInput, PlantInput};
pub use hierarchy::{LocationView, Placement, PlantView};

/// A typed snapshot of every table.
#[derive(Debug, Clone, Default)]
pub struct Garden {
    pub plants: Vec<Plant>,
    pub locations: Vec<Location>,
    pub containers: Vec<Container>,
}

impl Garden {
    /// Convert sheet rows into records. Rows without an ID are skipped.
    pub fn from_workbook(workbook: &Workbook) -> Self {
        Self {
            plants: records(workbook, Table::Plants),
            locations: records(workbook, Table::Locations),
            containers: records(workbook, Table::Containers),
        }
    }

    pub fn plant(&self, id: &str) -> Option<&Plant> {
        self.plants.iter().find(|p| p.plant_id == id.trim())
    }

    /// Look a plant up by ID, then by case-insensitive name.
    pub fn find_plant(&self, key: &str) -> Option<&Plant> {
        self.plant(key)
            .or_else(|| self.plants.iter().find(|p| p.has_name(key)))
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.location_id == id.trim())
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.container_id == id.trim())
    }

    pub fn containers_for_plant<'g>(&'g self, plant_id: &'g str) -> impl Iterator<Item = &'g Container> + 'g {
        self.containers.iter().filter(move |c| c.plant_id == plant_id)
    }

    pub fn containers_at<'g>(&'g self, location_id: &'g str) -> impl Iterator<Item = &'g Container> + 'g {
        self.containers.iter().filter(move |c| c.location_id == location_id)
    }
}

fn records<R: Record>(workbook: &Workbook, table: Table) -> Vec<R> {
    let sheet = workbook.sheet(table);
    let columns = ColumnMap::new(table, &sheet.header);
    sheet
        .rows
        .iter()
        .filter(|row| !ColumnMap::is_blank(row))
        .map(|row| R::from_row(&columns, row))
        .filter(|record| {
            let keep = !record.id().is_empty();
            if !keep {
                tracing::debug!(table = %table, "Skipping row without an ID");
            }
            keep
        })
        .collect()
}
