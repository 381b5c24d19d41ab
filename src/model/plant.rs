use serde::{Deserialize, Serialize};

use crate::model::fields::{parse_list, ColumnMap, FieldValue, Record, Table};

/// A row of the `Plants` sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Plant {
    pub plant_id: String,
    pub plant_name: String,
    pub description: String,
    /// Locations the plant is recorded at, in sheet order.
    pub location_ids: Vec<String>,
    pub light_requirements: String,
    pub watering_needs: String,
    pub care_notes: String,
    pub photo_url: String,
    pub last_updated: String,
}

impl Plant {
    /// Case-insensitive name comparison, ignoring surrounding whitespace.
    pub fn has_name(&self, name: &str) -> bool {
        self.plant_name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

impl Record for Plant {
    const TABLE: Table = Table::Plants;

    fn id(&self) -> &str {
        &self.plant_id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "plant_id" => FieldValue::text(&self.plant_id),
            "plant_name" => FieldValue::text(&self.plant_name),
            "description" => FieldValue::text(&self.description),
            "location_ids" => FieldValue::list(&self.location_ids),
            "light_requirements" => FieldValue::text(&self.light_requirements),
            "watering_needs" => FieldValue::text(&self.watering_needs),
            "care_notes" => FieldValue::text(&self.care_notes),
            "photo_url" => FieldValue::text(&self.photo_url),
            "last_updated" => FieldValue::text(&self.last_updated),
            _ => None,
        }
    }

    fn from_row(columns: &ColumnMap, row: &[String]) -> Self {
        let cell = |field: &str| columns.cell(row, field).to_string();
        Self {
            plant_id: cell("plant_id"),
            plant_name: cell("plant_name"),
            description: cell("description"),
            location_ids: parse_list(columns.cell(row, "location_ids")),
            light_requirements: cell("light_requirements"),
            watering_needs: cell("watering_needs"),
            care_notes: cell("care_notes"),
            photo_url: cell("photo_url"),
            last_updated: cell("last_updated"),
        }
    }

    fn cells(&self) -> Vec<(&'static str, String)> {
        vec![
            ("plant_id", self.plant_id.clone()),
            ("plant_name", self.plant_name.clone()),
            ("description", self.description.clone()),
            ("location_ids", self.location_ids.join(", ")),
            ("light_requirements", self.light_requirements.clone()),
            ("watering_needs", self.watering_needs.clone()),
            ("care_notes", self.care_notes.clone()),
            ("photo_url", self.photo_url.clone()),
            ("last_updated", self.last_updated.clone()),
        ]
    }
}
