use serde::{Deserialize, Serialize};

use crate::model::fields::{ColumnMap, FieldValue, Record, Table};

/// A row of the `Containers` sheet: one plant in one place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Container {
    pub container_id: String,
    pub plant_id: String,
    pub location_id: String,
    pub container_type: String,
    pub container_size: String,
    pub container_material: String,
}

impl Record for Container {
    const TABLE: Table = Table::Containers;

    fn id(&self) -> &str {
        &self.container_id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "container_id" => &self.container_id,
            "plant_id" => &self.plant_id,
            "location_id" => &self.location_id,
            "container_type" => &self.container_type,
            "container_size" => &self.container_size,
            "container_material" => &self.container_material,
            _ => return None,
        };
        FieldValue::text(value)
    }

    fn from_row(columns: &ColumnMap, row: &[String]) -> Self {
        let cell = |field: &str| columns.cell(row, field).to_string();
        Self {
            container_id: cell("container_id"),
            plant_id: cell("plant_id"),
            location_id: cell("location_id"),
            container_type: cell("container_type"),
            container_size: cell("container_size"),
            container_material: cell("container_material"),
        }
    }

    fn cells(&self) -> Vec<(&'static str, String)> {
        vec![
            ("container_id", self.container_id.clone()),
            ("plant_id", self.plant_id.clone()),
            ("location_id", self.location_id.clone()),
            ("container_type", self.container_type.clone()),
            ("container_size", self.container_size.clone()),
            ("container_material", self.container_material.clone()),
        ]
    }
}
