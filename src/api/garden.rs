//! Filter and query endpoints.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde_json::{json, Map, Value};

use crate::http::request::{json_body, query_params};
use crate::http::server::AppState;
use crate::http::ApiError;
use crate::model::Table;
use crate::query::{execute, GardenQuery, Operator, QueryOutcome, ResponseFormat};

/// `GET /api/garden/filter`
pub async fn filter(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<QueryOutcome>, ApiError> {
    let params = query_params(params)?;
    let query = GardenQuery::from_params(&params, state.query.max_limit)?;
    let garden = state.catalog.garden().await?;
    Ok(Json(execute(&garden, &query, "filter")))
}

/// `POST /api/garden/query`
pub async fn query(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<QueryOutcome>, ApiError> {
    let body = json_body(body, state.max_body_bytes)?;
    let query = GardenQuery::from_json(&body, state.query.max_limit)?;
    let garden = state.catalog.garden().await?;
    Ok(Json(execute(&garden, &query, "query")))
}

/// `GET /api/garden/fields`: what the query endpoint accepts.
pub async fn fields(State(state): State<AppState>) -> Json<Value> {
    let tables: Map<String, Value> = Table::ALL
        .into_iter()
        .map(|t| {
            let names: Vec<&str> = t.fields().iter().map(|f| f.name).collect();
            (t.name().to_string(), json!(names))
        })
        .collect();
    Json(json!({
        "tables": tables,
        "operators": Operator::ALL.map(Operator::symbol),
        "response_formats": ResponseFormat::ALL.map(ResponseFormat::name),
        "filter_params": [
            "location",
            "plant_name",
            "container_size",
            "container_material",
            "container_type",
            "response_format",
            "limit",
        ],
        "max_limit": state.query.max_limit,
    }))
}
