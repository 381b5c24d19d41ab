//! Record reads and writes against the backing store.
//!
//! # Responsibilities
//! - Produce typed `Garden` snapshots
//! - Create and update plants, locations and containers
//! - Allocate IDs and stamp `last_updated`
//!
//! # Design Decisions
//! - Writes are serialized through one async mutex so ID allocation does
//!   not race inside this process
//! - Rows are located by ID in the raw sheet, so unknown columns survive
//!   an update untouched
//! - References between tables are not checked on write

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::garden::Garden;
use crate::model::{ColumnMap, Container, Location, Plant, Record, Table};
use crate::store::{SheetStore, StoreError, Workbook};

/// Errors raised by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{table} record '{key}' not found")]
    NotFound { table: Table, key: String },

    #[error("a plant named '{0}' already exists")]
    Duplicate(String),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Plant fields accepted on create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlantInput {
    pub plant_name: Option<String>,
    pub description: Option<String>,
    pub location_ids: Option<Vec<String>>,
    pub light_requirements: Option<String>,
    pub watering_needs: Option<String>,
    pub care_notes: Option<String>,
    pub photo_url: Option<String>,
}

/// Location fields accepted on create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationInput {
    pub location_name: Option<String>,
    pub morning_sun_hours: Option<f64>,
    pub afternoon_sun_hours: Option<f64>,
    pub evening_sun_hours: Option<f64>,
    pub total_sun_hours: Option<f64>,
    pub microclimate_conditions: Option<String>,
}

/// Container fields accepted on create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerInput {
    pub plant_id: Option<String>,
    pub location_id: Option<String>,
    pub container_type: Option<String>,
    pub container_size: Option<String>,
    pub container_material: Option<String>,
}

/// Typed access to the garden over a [`SheetStore`].
#[derive(Debug)]
pub struct Catalog {
    store: Arc<dyn SheetStore>,
    writes: Mutex<()>,
}

impl Catalog {
    pub fn new(store: Arc<dyn SheetStore>) -> Self {
        Self {
            store,
            writes: Mutex::new(()),
        }
    }

    /// Current typed snapshot.
    pub async fn garden(&self) -> CatalogResult<Garden> {
        let workbook = self.store.read_workbook().await?;
        Ok(Garden::from_workbook(&workbook))
    }

    /// Plants whose name or description contains `search`, in sheet order.
    pub async fn list_plants(&self, search: Option<&str>) -> CatalogResult<Vec<Plant>> {
        let garden = self.garden().await?;
        let needle = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());
        Ok(match needle {
            Some(needle) => garden
                .plants
                .into_iter()
                .filter(|p| {
                    p.plant_name.to_lowercase().contains(&needle)
                        || p.description.to_lowercase().contains(&needle)
                })
                .collect(),
            None => garden.plants,
        })
    }

    pub async fn create_plant(&self, input: PlantInput) -> CatalogResult<Plant> {
        let _guard = self.writes.lock().await;
        let workbook = self.store.read_workbook().await?;
        let garden = Garden::from_workbook(&workbook);

        let name = required(input.plant_name.as_deref(), "plant_name")?;
        if garden.plants.iter().any(|p| p.has_name(&name)) {
            return Err(CatalogError::Duplicate(name));
        }

        let mut plant = Plant {
            plant_id: next_id(garden.plants.iter().map(|p| p.plant_id.as_str()))?,
            plant_name: name,
            last_updated: timestamp(),
            ..Default::default()
        };
        apply_plant(&mut plant, input);

        self.append(&workbook, &plant).await?;
        tracing::info!(plant_id = %plant.plant_id, plant_name = %plant.plant_name, "Plant created");
        Ok(plant)
    }

    /// Update the plant found by ID or name.
    pub async fn update_plant(&self, key: &str, input: PlantInput) -> CatalogResult<Plant> {
        let _guard = self.writes.lock().await;
        let workbook = self.store.read_workbook().await?;
        let garden = Garden::from_workbook(&workbook);

        let mut plant = garden
            .find_plant(key)
            .cloned()
            .ok_or_else(|| not_found(Table::Plants, key))?;

        if let Some(name) = input.plant_name.as_deref() {
            let name = required(Some(name), "plant_name")?;
            let taken = garden
                .plants
                .iter()
                .any(|p| p.plant_id != plant.plant_id && p.has_name(&name));
            if taken {
                return Err(CatalogError::Duplicate(name));
            }
        }

        apply_plant(&mut plant, input);
        plant.last_updated = timestamp();

        self.replace(&workbook, &plant).await?;
        tracing::info!(plant_id = %plant.plant_id, "Plant updated");
        Ok(plant)
    }

    pub async fn create_location(&self, input: LocationInput) -> CatalogResult<Location> {
        let _guard = self.writes.lock().await;
        let workbook = self.store.read_workbook().await?;
        let garden = Garden::from_workbook(&workbook);

        let name = required(input.location_name.as_deref(), "location_name")?;
        let mut location = Location {
            location_id: next_id(garden.locations.iter().map(|l| l.location_id.as_str()))?,
            location_name: name,
            ..Default::default()
        };
        apply_location(&mut location, input)?;

        self.append(&workbook, &location).await?;
        tracing::info!(location_id = %location.location_id, "Location created");
        Ok(location)
    }

    pub async fn update_location(&self, id: &str, input: LocationInput) -> CatalogResult<Location> {
        let _guard = self.writes.lock().await;
        let workbook = self.store.read_workbook().await?;
        let garden = Garden::from_workbook(&workbook);

        let mut location = garden
            .location(id)
            .cloned()
            .ok_or_else(|| not_found(Table::Locations, id))?;
        if let Some(name) = input.location_name.as_deref() {
            required(Some(name), "location_name")?;
        }
        apply_location(&mut location, input)?;

        self.replace(&workbook, &location).await?;
        tracing::info!(location_id = %location.location_id, "Location updated");
        Ok(location)
    }

    pub async fn create_container(&self, input: ContainerInput) -> CatalogResult<Container> {
        let _guard = self.writes.lock().await;
        let workbook = self.store.read_workbook().await?;
        let garden = Garden::from_workbook(&workbook);

        let mut container = Container {
            container_id: next_id(garden.containers.iter().map(|c| c.container_id.as_str()))?,
            plant_id: required(input.plant_id.as_deref(), "plant_id")?,
            location_id: required(input.location_id.as_deref(), "location_id")?,
            ..Default::default()
        };
        apply_container(&mut container, input);

        self.append(&workbook, &container).await?;
        tracing::info!(container_id = %container.container_id, "Container created");
        Ok(container)
    }

    pub async fn update_container(&self, id: &str, input: ContainerInput) -> CatalogResult<Container> {
        let _guard = self.writes.lock().await;
        let workbook = self.store.read_workbook().await?;
        let garden = Garden::from_workbook(&workbook);

        let mut container = garden
            .container(id)
            .cloned()
            .ok_or_else(|| not_found(Table::Containers, id))?;
        for (value, field) in [(&input.plant_id, "plant_id"), (&input.location_id, "location_id")] {
            if let Some(value) = value.as_deref() {
                required(Some(value), field)?;
            }
        }
        apply_container(&mut container, input);

        self.replace(&workbook, &container).await?;
        tracing::info!(container_id = %container.container_id, "Container updated");
        Ok(container)
    }

    async fn append<R: Record>(&self, workbook: &Workbook, record: &R) -> CatalogResult<()> {
        let columns = ColumnMap::new(R::TABLE, &workbook.sheet(R::TABLE).header);
        let row = columns.encode(record, Vec::new());
        self.store.append_row(R::TABLE, row).await?;
        Ok(())
    }

    async fn replace<R: Record>(&self, workbook: &Workbook, record: &R) -> CatalogResult<()> {
        let sheet = workbook.sheet(R::TABLE);
        let columns = ColumnMap::new(R::TABLE, &sheet.header);
        let id_field = R::TABLE.fields()[0].name;
        let index = sheet
            .rows
            .iter()
            .position(|row| columns.cell(row, id_field) == record.id())
            .ok_or_else(|| not_found(R::TABLE, record.id()))?;

        let row = columns.encode(record, sheet.rows[index].clone());
        self.store.update_row(R::TABLE, index, row).await?;
        Ok(())
    }
}

fn not_found(table: Table, key: &str) -> CatalogError {
    CatalogError::NotFound {
        table,
        key: key.to_string(),
    }
}

fn required(value: Option<&str>, field: &str) -> CatalogResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(CatalogError::Invalid(format!("{} is required", field))),
    }
}

/// One past the largest numeric ID; non-numeric IDs are ignored.
fn next_id<'a>(ids: impl Iterator<Item = &'a str>) -> CatalogResult<String> {
    let max = ids.filter_map(|id| id.trim().parse::<u64>().ok()).max().unwrap_or(0);
    max.checked_add(1)
        .map(|id| id.to_string())
        .ok_or_else(|| CatalogError::Invalid(format!("no ID left after {}", max)))
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

fn apply_plant(plant: &mut Plant, input: PlantInput) {
    if let Some(v) = input.plant_name {
        plant.plant_name = trimmed(v);
    }
    if let Some(v) = input.description {
        plant.description = trimmed(v);
    }
    if let Some(v) = input.location_ids {
        plant.location_ids = v.into_iter().map(trimmed).filter(|s| !s.is_empty()).collect();
    }
    if let Some(v) = input.light_requirements {
        plant.light_requirements = trimmed(v);
    }
    if let Some(v) = input.watering_needs {
        plant.watering_needs = trimmed(v);
    }
    if let Some(v) = input.care_notes {
        plant.care_notes = trimmed(v);
    }
    if let Some(v) = input.photo_url {
        plant.photo_url = trimmed(v);
    }
}

fn apply_location(location: &mut Location, input: LocationInput) -> CatalogResult<()> {
    let hours = [
        ("morning_sun_hours", input.morning_sun_hours),
        ("afternoon_sun_hours", input.afternoon_sun_hours),
        ("evening_sun_hours", input.evening_sun_hours),
        ("total_sun_hours", input.total_sun_hours),
    ];
    for (field, value) in hours {
        if let Some(v) = value {
            if !(0.0..=24.0).contains(&v) {
                return Err(CatalogError::Invalid(format!(
                    "{} must be between 0 and 24",
                    field
                )));
            }
        }
    }

    let windows_changed = input.morning_sun_hours.is_some()
        || input.afternoon_sun_hours.is_some()
        || input.evening_sun_hours.is_some();

    if let Some(v) = input.location_name {
        location.location_name = trimmed(v);
    }
    if input.morning_sun_hours.is_some() {
        location.morning_sun_hours = input.morning_sun_hours;
    }
    if input.afternoon_sun_hours.is_some() {
        location.afternoon_sun_hours = input.afternoon_sun_hours;
    }
    if input.evening_sun_hours.is_some() {
        location.evening_sun_hours = input.evening_sun_hours;
    }
    match input.total_sun_hours {
        Some(total) => location.total_sun_hours = Some(total),
        None if windows_changed => {
            location.total_sun_hours = None;
            location.derive_total();
        }
        None => location.derive_total(),
    }
    if let Some(v) = input.microclimate_conditions {
        location.microclimate_conditions = trimmed(v);
    }
    Ok(())
}

fn apply_container(container: &mut Container, input: ContainerInput) {
    if let Some(v) = input.plant_id {
        container.plant_id = trimmed(v);
    }
    if let Some(v) = input.location_id {
        container.location_id = trimmed(v);
    }
    if let Some(v) = input.container_type {
        container.container_type = trimmed(v);
    }
    if let Some(v) = input.container_size {
        container.container_size = trimmed(v);
    }
    if let Some(v) = input.container_material {
        container.container_material = trimmed(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garden::fixtures;
    use crate::store::WorkbookStore;

    fn catalog() -> Catalog {
        Catalog::new(Arc::new(WorkbookStore::in_memory(fixtures::workbook())))
    }

    #[tokio::test]
    async fn test_create_plant_allocates_next_id() {
        let catalog = catalog();
        let plant = catalog
            .create_plant(PlantInput {
                plant_name: Some("  Sage ".into()),
                location_ids: Some(vec!["3".into()]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(plant.plant_id, "7");
        assert_eq!(plant.plant_name, "Sage");
        assert!(!plant.last_updated.is_empty());

        let garden = catalog.garden().await.unwrap();
        assert_eq!(garden.find_plant("sage").unwrap().location_ids, vec!["3"]);
    }

    #[tokio::test]
    async fn test_create_plant_rejects_duplicates_and_blank_names() {
        let catalog = catalog();
        let dup = catalog
            .create_plant(PlantInput {
                plant_name: Some("tomato".into()),
                ..Default::default()
            })
            .await;
        assert!(matches!(dup, Err(CatalogError::Duplicate(_))));

        let blank = catalog.create_plant(PlantInput::default()).await;
        assert!(matches!(blank, Err(CatalogError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_update_plant_by_name_keeps_other_fields() {
        let catalog = catalog();
        let updated = catalog
            .update_plant(
                "Basil",
                PlantInput {
                    care_notes: Some("Pinch flowers".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.plant_id, "2");
        assert_eq!(updated.description, "Sweet basil");

        // The fixture sheet has no Care Notes column; the value is dropped.
        let garden = catalog.garden().await.unwrap();
        assert_eq!(garden.plant("2").unwrap().care_notes, "");
        assert_eq!(garden.plant("2").unwrap().location_ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_update_missing_plant() {
        let err = catalog()
            .update_plant("Cactus", PlantInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { table: Table::Plants, .. }));
    }

    #[tokio::test]
    async fn test_location_hours_validated_and_total_rederived() {
        let catalog = catalog();
        let bad = catalog
            .create_location(LocationInput {
                location_name: Some("Greenhouse".into()),
                morning_sun_hours: Some(30.0),
                ..Default::default()
            })
            .await;
        assert!(matches!(bad, Err(CatalogError::Invalid(_))));

        let updated = catalog
            .update_location(
                "1",
                LocationInput {
                    evening_sun_hours: Some(3.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.total_sun_hours, Some(9.0));
    }

    #[tokio::test]
    async fn test_create_container_requires_references() {
        let catalog = catalog();
        let err = catalog
            .create_container(ContainerInput {
                plant_id: Some("1".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "location_id is required");

        let container = catalog
            .create_container(ContainerInput {
                plant_id: Some("4".into()),
                location_id: Some("4".into()),
                container_type: Some("Hanging Basket".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(container.container_id, "7");
    }

    #[test]
    fn test_next_id_ignores_non_numeric() {
        assert_eq!(next_id(["1", "x-9", " 12 "].into_iter()).unwrap(), "13");
        assert_eq!(next_id(std::iter::empty()).unwrap(), "1");
    }

    #[test]
    fn test_next_id_exhausted() {
        let err = next_id(["3", "18446744073709551615"].into_iter()).unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_create_fails_cleanly_when_ids_exhausted() {
        let mut workbook = fixtures::workbook();
        let mut row = vec![String::new(); workbook.plants.header.len()];
        row[0] = u64::MAX.to_string();
        row[1] = "Giant Sequoia".into();
        workbook.plants.rows.push(row);
        let catalog = Catalog::new(Arc::new(WorkbookStore::in_memory(workbook)));

        let err = catalog
            .create_plant(PlantInput {
                plant_name: Some("Sage".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(_)));
        assert_eq!(catalog.garden().await.unwrap().plants.len(), 7);
    }
}
