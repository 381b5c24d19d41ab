//! REST API handlers.
//!
//! # Routes
//! ```text
//! GET  /health
//! GET  /api/plants               POST /api/plants
//! GET  /api/plants/{plant}       PUT  /api/plants/{plant}
//! GET  /api/locations            POST /api/locations
//! GET  /api/locations/{id}       PUT  /api/locations/{id}
//! GET  /api/containers           POST /api/containers
//! GET  /api/containers/{id}      PUT  /api/containers/{id}
//! GET  /api/garden/filter        POST /api/garden/query
//! GET  /api/garden/fields
//! ```

pub mod containers;
pub mod garden;
pub mod locations;
pub mod plants;

use axum::{
    http::Uri,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::http::server::AppState;
use crate::http::ApiError;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub fn setup_api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/plants", get(plants::list).post(plants::create))
        .route("/api/plants/{plant}", get(plants::get).put(plants::update))
        .route("/api/locations", get(locations::list).post(locations::create))
        .route("/api/locations/{id}", get(locations::get).put(locations::update))
        .route("/api/containers", get(containers::list).post(containers::create))
        .route("/api/containers/{id}", get(containers::get).put(containers::update))
        .route("/api/garden/filter", get(garden::filter))
        .route("/api/garden/query", post(garden::query))
        .route("/api/garden/fields", get(garden::fields))
        .fallback(no_route)
        .with_state(state)
}

pub async fn health() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

async fn no_route(uri: Uri) -> ApiError {
    ApiError::NoRoute(uri.path().to_string())
}
