//! Query parsing and execution over a garden snapshot.

use serde::Serialize;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use crate::garden::{Garden, Placement, PlantView};
use crate::model::Table;
use crate::observability::metrics;
use crate::query::error::QueryError;
use crate::query::filter::TableFilter;
use crate::query::format::ResponseFormat;
use crate::query::operator::{Condition, Operator};

const BODY_KEYS: &str = "filters, response_format, limit";
const FILTER_PARAMS: &str =
    "location, plant_name, container_size, container_material, container_type, response_format, limit";

/// A validated query: one filter per table plus output options.
#[derive(Debug, Clone)]
pub struct GardenQuery {
    pub plants: TableFilter,
    pub locations: TableFilter,
    pub containers: TableFilter,
    pub format: ResponseFormat,
    pub limit: Option<usize>,
}

impl Default for GardenQuery {
    fn default() -> Self {
        Self {
            plants: TableFilter::empty(Table::Plants),
            locations: TableFilter::empty(Table::Locations),
            containers: TableFilter::empty(Table::Containers),
            format: ResponseFormat::default(),
            limit: None,
        }
    }
}

impl GardenQuery {
    /// Parse an advanced query body.
    pub fn from_json(body: &Value, max_limit: usize) -> Result<Self, QueryError> {
        let object = match body {
            Value::Null => return Err(QueryError::MissingBody),
            Value::Object(object) => object,
            _ => return Err(QueryError::Malformed("body must be a JSON object".into())),
        };

        let mut query = Self::default();
        for (key, value) in object {
            match key.as_str() {
                "filters" => query.set_filters(value)?,
                "response_format" => {
                    query.format = match value {
                        Value::Null => ResponseFormat::default(),
                        Value::String(s) => s.parse()?,
                        other => return Err(QueryError::InvalidResponseFormat(other.to_string())),
                    }
                }
                "limit" => query.limit = json_limit(value, max_limit)?,
                _ => {
                    return Err(QueryError::InvalidField {
                        scope: "query".into(),
                        field: key.clone(),
                        valid: BODY_KEYS.into(),
                    })
                }
            }
        }
        Ok(query)
    }

    /// Parse the simple filter endpoint's URL parameters.
    ///
    /// `location` and `plant_name` are substring matches on names; the
    /// container parameters are case-insensitive equality. Blank values
    /// are ignored. Each parameter may be given once.
    pub fn from_params(params: &[(String, String)], max_limit: usize) -> Result<Self, QueryError> {
        let mut query = Self::default();
        let mut seen: Vec<&str> = Vec::new();
        for (key, value) in params {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if seen.contains(&key.as_str()) {
                return Err(QueryError::Malformed(format!(
                    "parameter '{}' given more than once",
                    key
                )));
            }
            seen.push(key);
            let operand = Value::String(value.to_string());
            match key.as_str() {
                "location" => query
                    .locations
                    .push("location_name", Condition::new(Operator::Contains, &operand)?),
                "plant_name" => query
                    .plants
                    .push("plant_name", Condition::new(Operator::Contains, &operand)?),
                "container_size" | "container_material" | "container_type" => {
                    let field = Table::Containers
                        .field(key)
                        .map(|f| f.name)
                        .unwrap_or("container_type");
                    query.containers.push(field, Condition::new(Operator::Eq, &operand)?);
                }
                "response_format" => query.format = value.parse()?,
                "limit" => query.limit = Some(parse_limit(value, max_limit)?),
                _ => {
                    return Err(QueryError::InvalidField {
                        scope: "filter".into(),
                        field: key.clone(),
                        valid: FILTER_PARAMS.into(),
                    })
                }
            }
        }
        Ok(query)
    }

    fn set_filters(&mut self, value: &Value) -> Result<(), QueryError> {
        let object = match value {
            Value::Null => return Ok(()),
            Value::Object(object) => object,
            _ => return Err(QueryError::Malformed("filters must be an object keyed by table".into())),
        };
        for (name, filter) in object {
            let table = Table::parse(name).ok_or_else(|| QueryError::InvalidTable(name.clone()))?;
            let parsed = TableFilter::parse(table, filter)?;
            match table {
                Table::Plants => self.plants = parsed,
                Table::Locations => self.locations = parsed,
                Table::Containers => self.containers = parsed,
            }
        }
        Ok(())
    }

    /// The normalized filters, omitting tables without conditions.
    pub fn applied(&self) -> Value {
        let mut applied = Map::new();
        for filter in [&self.plants, &self.locations, &self.containers] {
            if !filter.is_empty() {
                applied.insert(filter.table().name().to_string(), filter.to_json());
            }
        }
        Value::Object(applied)
    }

    /// Narrow a plant's placements to the location and container filters.
    /// Returns `None` when a given filter leaves nothing behind.
    fn select<'g>(&self, mut view: PlantView<'g>) -> Option<PlantView<'g>> {
        if !self.plants.matches(view.plant) {
            return None;
        }
        if !self.locations.is_empty() {
            view.placements.retain(|p| self.locations.matches(p.location));
            if view.placements.is_empty() {
                return None;
            }
        }
        if !self.containers.is_empty() {
            view.placements = view
                .placements
                .into_iter()
                .filter_map(|p| {
                    let containers: Vec<_> = p
                        .containers
                        .into_iter()
                        .filter(|c| self.containers.matches(*c))
                        .collect();
                    (!containers.is_empty()).then_some(Placement {
                        location: p.location,
                        containers,
                    })
                })
                .collect();
            if view.placements.is_empty() {
                return None;
            }
        }
        Some(view)
    }
}

/// The response envelope for filter and query endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub count: usize,
    pub total_matches: usize,
    pub response_format: ResponseFormat,
    pub debug_signature: String,
    pub filters_applied: Value,
    pub plants: Vec<Value>,
}

/// Run `query` against `garden`. `endpoint` labels the signature and metrics.
pub fn execute(garden: &Garden, query: &GardenQuery, endpoint: &str) -> QueryOutcome {
    let matched: Vec<PlantView<'_>> = garden
        .plants
        .iter()
        .filter_map(|plant| query.select(PlantView::resolve(garden, plant)))
        .collect();

    let total_matches = matched.len();
    let plants: Vec<Value> = matched
        .iter()
        .take(query.limit.unwrap_or(usize::MAX))
        .map(|view| query.format.shape(view))
        .collect();

    let filters_applied = query.applied();
    let debug_signature = signature(endpoint, &filters_applied, query, total_matches);

    tracing::debug!(
        endpoint,
        total_matches,
        returned = plants.len(),
        format = %query.format,
        signature = %debug_signature,
        "Query executed"
    );
    metrics::record_query(endpoint, query.format.name(), total_matches);

    QueryOutcome {
        count: plants.len(),
        total_matches,
        response_format: query.format,
        debug_signature,
        filters_applied,
        plants,
    }
}

/// `<endpoint>-v1:` plus a short hash of everything that determined the reply.
fn signature(endpoint: &str, filters: &Value, query: &GardenQuery, total: usize) -> String {
    let mut hasher = Sha256::new();
    for part in [
        endpoint.to_string(),
        filters.to_string(),
        query.format.name().to_string(),
        json!(query.limit).to_string(),
        total.to_string(),
    ] {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(6).map(|b| format!("{:02x}", b)).collect();
    format!("{}-v1:{}", endpoint, hex)
}

/// Parse a limit given as text, e.g. from a URL parameter.
pub fn parse_limit(raw: &str, max: usize) -> Result<usize, QueryError> {
    let limit = raw.trim().parse::<usize>().map_err(|_| QueryError::InvalidLimit {
        value: raw.to_string(),
        max,
    })?;
    check_limit(limit, raw, max)
}

fn json_limit(value: &Value, max: usize) -> Result<Option<usize>, QueryError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_u64() {
            Some(limit) => check_limit(limit as usize, &n.to_string(), max).map(Some),
            None => Err(QueryError::InvalidLimit {
                value: n.to_string(),
                max,
            }),
        },
        other => Err(QueryError::InvalidLimit {
            value: other.to_string(),
            max,
        }),
    }
}

fn check_limit(limit: usize, raw: &str, max: usize) -> Result<usize, QueryError> {
    if (1..=max).contains(&limit) {
        Ok(limit)
    } else {
        Err(QueryError::InvalidLimit {
            value: raw.to_string(),
            max,
        })
    }
}
