use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::garden::{CatalogError, LocationInput, LocationView};
use crate::http::request::{decode_input, json_body};
use crate::http::server::AppState;
use crate::http::ApiError;
use crate::model::{Location, Table};

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let garden = state.catalog.garden().await?;
    Ok(Json(json!({
        "count": garden.locations.len(),
        "locations": garden.locations,
    })))
}

/// A location with the containers placed there and their plants.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let garden = state.catalog.garden().await?;
    let location = garden.location(&id).ok_or_else(|| CatalogError::NotFound {
        table: Table::Locations,
        key: id.clone(),
    })?;
    Ok(Json(LocationView::resolve(&garden, location).to_json()))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    let input: LocationInput = decode_input(json_body(body, state.max_body_bytes)?)?;
    let location = state.catalog.create_location(input).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Location>, ApiError> {
    let input: LocationInput = decode_input(json_body(body, state.max_body_bytes)?)?;
    let location = state.catalog.update_location(&id, input).await?;
    Ok(Json(location))
}
