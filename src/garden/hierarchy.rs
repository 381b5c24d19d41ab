//! Plant → locations → containers resolution.
//!
//! A plant's locations are the ones listed on the plant row followed by
//! any further locations its containers sit in. References that do not
//! resolve to a location row are dropped, so every placement carries a
//! location name.

use serde_json::{json, Value};

use crate::garden::Garden;
use crate::model::{Container, Location, Plant};

/// A plant at one location, with its containers there.
#[derive(Debug, Clone)]
pub struct Placement<'g> {
    pub location: &'g Location,
    pub containers: Vec<&'g Container>,
}

/// A plant with its resolved placements.
#[derive(Debug, Clone)]
pub struct PlantView<'g> {
    pub plant: &'g Plant,
    pub placements: Vec<Placement<'g>>,
}

impl<'g> PlantView<'g> {
    pub fn resolve(garden: &'g Garden, plant: &'g Plant) -> Self {
        let containers: Vec<&Container> = garden.containers_for_plant(&plant.plant_id).collect();

        let mut location_ids: Vec<&str> = Vec::new();
        let referenced = plant
            .location_ids
            .iter()
            .map(String::as_str)
            .chain(containers.iter().map(|c| c.location_id.as_str()));
        for id in referenced {
            if !id.is_empty() && !location_ids.contains(&id) {
                location_ids.push(id);
            }
        }

        let placements = location_ids
            .into_iter()
            .filter_map(|id| match garden.location(id) {
                Some(location) => Some(Placement {
                    location,
                    containers: containers
                        .iter()
                        .copied()
                        .filter(|c| c.location_id == location.location_id)
                        .collect(),
                }),
                None => {
                    tracing::debug!(
                        plant_id = %plant.plant_id,
                        location_id = id,
                        "Dropping unresolved location reference"
                    );
                    None
                }
            })
            .collect();

        Self { plant, placements }
    }

    pub fn containers(&self) -> impl Iterator<Item = &'g Container> + '_ {
        self.placements.iter().flat_map(|p| p.containers.iter().copied())
    }

    /// Full JSON rendering: every field of every record.
    pub fn to_json(&self) -> Value {
        let mut plant = json!(self.plant);
        plant["locations"] = Value::Array(
            self.placements
                .iter()
                .map(|p| {
                    let mut location = json!(p.location);
                    location["containers"] = json!(p.containers);
                    location
                })
                .collect(),
        );
        plant
    }
}

/// A location with its containers and the plants in them.
#[derive(Debug, Clone)]
pub struct LocationView<'g> {
    pub location: &'g Location,
    pub containers: Vec<(&'g Container, Option<&'g Plant>)>,
}

impl<'g> LocationView<'g> {
    pub fn resolve(garden: &'g Garden, location: &'g Location) -> Self {
        let containers = garden
            .containers_at(&location.location_id)
            .map(|c| (c, garden.plant(&c.plant_id)))
            .collect();
        Self { location, containers }
    }

    pub fn to_json(&self) -> Value {
        let mut location = json!(self.location);
        location["containers"] = Value::Array(
            self.containers
                .iter()
                .map(|(container, plant)| {
                    let mut entry = json!(container);
                    if let Some(plant) = plant {
                        entry["plant_name"] = json!(plant.plant_name);
                    }
                    entry
                })
                .collect(),
        );
        location
    }
}
