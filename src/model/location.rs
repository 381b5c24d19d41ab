use serde::{Deserialize, Serialize};

use crate::model::fields::{format_number, parse_number, ColumnMap, FieldValue, Record, Table};

/// A row of the `Locations` sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub location_id: String,
    pub location_name: String,
    pub morning_sun_hours: Option<f64>,
    pub afternoon_sun_hours: Option<f64>,
    pub evening_sun_hours: Option<f64>,
    /// Sum of the daily windows when the sheet leaves it blank.
    pub total_sun_hours: Option<f64>,
    pub microclimate_conditions: String,
}

impl Location {
    /// Fill `total_sun_hours` from the per-window hours if it is unset.
    pub fn derive_total(&mut self) {
        if self.total_sun_hours.is_some() {
            return;
        }
        let windows = [
            self.morning_sun_hours,
            self.afternoon_sun_hours,
            self.evening_sun_hours,
        ];
        if windows.iter().any(Option::is_some) {
            self.total_sun_hours = Some(windows.iter().flatten().sum());
        }
    }
}

impl Record for Location {
    const TABLE: Table = Table::Locations;

    fn id(&self) -> &str {
        &self.location_id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "location_id" => FieldValue::text(&self.location_id),
            "location_name" => FieldValue::text(&self.location_name),
            "morning_sun_hours" => FieldValue::number(self.morning_sun_hours),
            "afternoon_sun_hours" => FieldValue::number(self.afternoon_sun_hours),
            "evening_sun_hours" => FieldValue::number(self.evening_sun_hours),
            "total_sun_hours" => FieldValue::number(self.total_sun_hours),
            "microclimate_conditions" => FieldValue::text(&self.microclimate_conditions),
            _ => None,
        }
    }

    fn from_row(columns: &ColumnMap, row: &[String]) -> Self {
        let number = |field: &str| parse_number(columns.cell(row, field));
        let mut location = Self {
            location_id: columns.cell(row, "location_id").to_string(),
            location_name: columns.cell(row, "location_name").to_string(),
            morning_sun_hours: number("morning_sun_hours"),
            afternoon_sun_hours: number("afternoon_sun_hours"),
            evening_sun_hours: number("evening_sun_hours"),
            total_sun_hours: number("total_sun_hours"),
            microclimate_conditions: columns.cell(row, "microclimate_conditions").to_string(),
        };
        location.derive_total();
        location
    }

    fn cells(&self) -> Vec<(&'static str, String)> {
        vec![
            ("location_id", self.location_id.clone()),
            ("location_name", self.location_name.clone()),
            ("morning_sun_hours", format_number(self.morning_sun_hours)),
            ("afternoon_sun_hours", format_number(self.afternoon_sun_hours)),
            ("evening_sun_hours", format_number(self.evening_sun_hours)),
            ("total_sun_hours", format_number(self.total_sun_hours)),
            ("microclimate_conditions", self.microclimate_conditions.clone()),
        ]
    }
}
