//! Error responses.
//!
//! # Design Decisions
//! - Every failure is a JSON body `{"error": <kind>, "message": <text>}`
//! - Store failures map to 502 Bad Gateway since the spreadsheet is an
//!   upstream dependency

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::garden::CatalogError;
use crate::observability::metrics;
use crate::query::QueryError;

/// An error returned from an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("request body could not be read: {0}")]
    BadBody(String),

    #[error("query string could not be parsed: {0}")]
    BadQuery(String),

    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("rate limit exceeded, slow down")]
    RateLimited,

    #[error("no route for {0}")]
    NoRoute(String),

    #[error("request took too long to complete")]
    Timeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Query(_) | ApiError::BadBody(_) | ApiError::BadQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Catalog(e) => match e {
                CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
                CatalogError::Duplicate(_) => StatusCode::CONFLICT,
                CatalogError::Invalid(_) => StatusCode::BAD_REQUEST,
                CatalogError::Store(_) => StatusCode::BAD_GATEWAY,
            },
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NoRoute(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Query(e) => e.kind(),
            ApiError::Catalog(e) => match e {
                CatalogError::NotFound { .. } => "not_found",
                CatalogError::Duplicate(_) => "duplicate",
                CatalogError::Invalid(_) => "invalid_input",
                CatalogError::Store(_) => "store_error",
            },
            ApiError::BadBody(_) => "invalid_body",
            ApiError::BadQuery(_) => "invalid_query",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::RateLimited => "rate_limited",
            ApiError::NoRoute(_) => "not_found",
            ApiError::Timeout => "timeout",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Catalog(CatalogError::Store(e)) = &self {
            tracing::error!(error = %e, "Store operation failed");
            metrics::record_store_error("api");
        } else {
            tracing::debug!(kind = self.kind(), error = %self, "Request rejected");
        }
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;
    use crate::store::StoreError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(QueryError::MissingBody), StatusCode::BAD_REQUEST, "missing_body"),
            (
                ApiError::from(CatalogError::NotFound {
                    table: Table::Plants,
                    key: "Cactus".into(),
                }),
                StatusCode::NOT_FOUND,
                "not_found",
            ),
            (
                ApiError::from(CatalogError::Duplicate("Basil".into())),
                StatusCode::CONFLICT,
                "duplicate",
            ),
            (
                ApiError::from(CatalogError::Store(StoreError::Parse("bad".into()))),
                StatusCode::BAD_GATEWAY,
                "store_error",
            ),
            (ApiError::PayloadTooLarge(10), StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            (ApiError::BadQuery("x".into()), StatusCode::BAD_REQUEST, "invalid_query"),
            (ApiError::Timeout, StatusCode::REQUEST_TIMEOUT, "timeout"),
        ];
        for (err, status, kind) in cases {
            assert_eq!(err.status(), status);
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn test_response_carries_status() {
        let response = ApiError::from(QueryError::InvalidTable("pots".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
