use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::garden::{CatalogError, ContainerInput, Garden};
use crate::http::request::{decode_input, json_body, query_params};
use crate::http::server::AppState;
use crate::http::ApiError;
use crate::model::{Container, Table};

/// Container JSON with the plant and location names resolved where possible.
fn describe(garden: &Garden, container: &Container) -> Value {
    let mut entry = json!(container);
    if let Some(plant) = garden.plant(&container.plant_id) {
        entry["plant_name"] = json!(plant.plant_name);
    }
    if let Some(location) = garden.location(&container.location_id) {
        entry["location_name"] = json!(location.location_name);
    }
    entry
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub plant_id: Option<String>,
    pub location_id: Option<String>,
}

/// `GET /api/containers`, optionally narrowed to one plant or location.
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let params = query_params(params)?;
    let garden = state.catalog.garden().await?;
    let wanted = |filter: &Option<String>, value: &str| {
        filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map_or(true, |f| f == value)
    };
    let containers: Vec<Value> = garden
        .containers
        .iter()
        .filter(|c| wanted(&params.plant_id, &c.plant_id) && wanted(&params.location_id, &c.location_id))
        .map(|c| describe(&garden, c))
        .collect();
    Ok(Json(json!({
        "count": containers.len(),
        "containers": containers,
    })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let garden = state.catalog.garden().await?;
    let container = garden.container(&id).ok_or_else(|| CatalogError::NotFound {
        table: Table::Containers,
        key: id.clone(),
    })?;
    Ok(Json(describe(&garden, container)))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Container>), ApiError> {
    let input: ContainerInput = decode_input(json_body(body, state.max_body_bytes)?)?;
    let container = state.catalog.create_container(input).await?;
    Ok((StatusCode::CREATED, Json(container)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Container>, ApiError> {
    let input: ContainerInput = decode_input(json_body(body, state.max_body_bytes)?)?;
    let container = state.catalog.update_container(&id, input).await?;
    Ok(Json(container))
}
