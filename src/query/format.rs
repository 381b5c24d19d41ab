//! Response shaping for matched plants.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};

use crate::garden::PlantView;
use crate::query::error::QueryError;

/// How much of each matched plant to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    Summary,
    Detailed,
    Minimal,
    IdsOnly,
}

impl ResponseFormat {
    pub const ALL: [ResponseFormat; 4] = [
        ResponseFormat::Summary,
        ResponseFormat::Detailed,
        ResponseFormat::Minimal,
        ResponseFormat::IdsOnly,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResponseFormat::Summary => "summary",
            ResponseFormat::Detailed => "detailed",
            ResponseFormat::Minimal => "minimal",
            ResponseFormat::IdsOnly => "ids_only",
        }
    }

    /// Render one plant in this format.
    pub fn shape(self, view: &PlantView<'_>) -> Value {
        match self {
            ResponseFormat::Summary => summary(view),
            ResponseFormat::Detailed => view.to_json(),
            ResponseFormat::Minimal => json!({
                "plant_name": view.plant.plant_name,
                "locations": view
                    .placements
                    .iter()
                    .map(|p| p.location.location_name.as_str())
                    .collect::<Vec<_>>(),
            }),
            ResponseFormat::IdsOnly => json!(view.plant.plant_id),
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ResponseFormat::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| QueryError::InvalidResponseFormat(s.to_string()))
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn summary(view: &PlantView<'_>) -> Value {
    let locations: Vec<Value> = view
        .placements
        .iter()
        .map(|p| {
            json!({
                "location_id": p.location.location_id,
                "location_name": p.location.location_name,
                "total_sun_hours": p.location.total_sun_hours,
                "containers": p
                    .containers
                    .iter()
                    .map(|c| json!({
                        "container_id": c.container_id,
                        "type": c.container_type,
                        "size": c.container_size,
                        "material": c.container_material,
                    }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "plant_id": view.plant.plant_id,
        "plant_name": view.plant.plant_name,
        "description": view.plant.description,
        "locations": locations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garden::fixtures;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("IDS_ONLY".parse::<ResponseFormat>().unwrap(), ResponseFormat::IdsOnly);
        assert_eq!(" detailed ".parse::<ResponseFormat>().unwrap(), ResponseFormat::Detailed);
        let err = "verbose".parse::<ResponseFormat>().unwrap_err();
        assert_eq!(err.kind(), "invalid_response_format");
    }

    #[test]
    fn test_shapes() {
        let garden = fixtures::garden();
        let view = PlantView::resolve(&garden, garden.plant("2").unwrap());

        let summary = ResponseFormat::Summary.shape(&view);
        assert_eq!(summary["plant_name"], "Basil");
        assert_eq!(summary["locations"][0]["location_name"], "Patio");
        assert_eq!(summary["locations"][0]["total_sun_hours"], 7.0);
        assert_eq!(summary["locations"][1]["containers"][0]["type"], "Window Box");
        assert!(summary.get("light_requirements").is_none());

        let detailed = ResponseFormat::Detailed.shape(&view);
        assert_eq!(detailed["light_requirements"], "Full Sun");
        assert_eq!(detailed["locations"][0]["morning_sun_hours"], 2.0);
        assert_eq!(detailed["locations"][1]["containers"][0]["container_material"], "Plastic");

        assert_eq!(
            ResponseFormat::Minimal.shape(&view),
            json!({"plant_name": "Basil", "locations": ["Patio", "Kitchen Window"]})
        );
        assert_eq!(ResponseFormat::IdsOnly.shape(&view), json!("2"));
    }

    #[test]
    fn test_serializes_snake_case() {
        assert_eq!(json!(ResponseFormat::IdsOnly), json!("ids_only"));
    }
}
