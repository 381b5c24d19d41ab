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

use crate::garden::{CatalogError, PlantInput, PlantView};
use crate::http::request::{decode_input, json_body, query_params};
use crate::http::server::AppState;
use crate::http::ApiError;
use crate::model::{Plant, Table};
use crate::query::parse_limit;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub limit: Option<String>,
}

/// `GET /api/plants`
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let params = query_params(params)?;
    let limit = match params.limit.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_limit(raw, state.query.max_limit)?,
        None => usize::MAX,
    };
    let plants = state.catalog.list_plants(params.q.as_deref()).await?;
    let total = plants.len();
    let plants: Vec<Plant> = plants.into_iter().take(limit).collect();
    Ok(Json(json!({
        "count": plants.len(),
        "total_matches": total,
        "plants": plants,
    })))
}

/// `GET /api/plants/{plant}`, by ID or name, with locations and containers.
pub async fn get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let garden = state.catalog.garden().await?;
    let plant = garden.find_plant(&key).ok_or_else(|| CatalogError::NotFound {
        table: Table::Plants,
        key: key.clone(),
    })?;
    Ok(Json(PlantView::resolve(&garden, plant).to_json()))
}

/// `POST /api/plants`
pub async fn create(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Plant>), ApiError> {
    let input: PlantInput = decode_input(json_body(body, state.max_body_bytes)?)?;
    let plant = state.catalog.create_plant(input).await?;
    Ok((StatusCode::CREATED, Json(plant)))
}

/// `PUT /api/plants/{plant}`
pub async fn update(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Plant>, ApiError> {
    let input: PlantInput = decode_input(json_body(body, state.max_body_bytes)?)?;
    let plant = state.catalog.update_plant(&key, input).await?;
    Ok(Json(plant))
}
