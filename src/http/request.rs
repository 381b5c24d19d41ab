//! Request body and query string decoding.
//!
//! Handlers take the raw extractor results so that empty, malformed and
//! oversized input all come back as JSON errors rather than axum's
//! plain-text rejections.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query,
    },
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::garden::CatalogError;
use crate::http::ApiError;
use crate::query::QueryError;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Parse a request body as JSON. An empty body is `Value::Null`.
pub fn json_body(body: Result<Bytes, BytesRejection>, max_bytes: usize) -> Result<Value, ApiError> {
    let bytes = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(max_bytes)
        } else {
            ApiError::BadBody(rejection.body_text())
        }
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| QueryError::InvalidJson(e.to_string()).into())
}

/// Unwrap query string parameters.
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::BadQuery(rejection.body_text()))
}

/// Decode a record input from a JSON body.
pub fn decode_input<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    if value.is_null() {
        return Err(QueryError::MissingBody.into());
    }
    serde_json::from_value(value).map_err(|e| CatalogError::Invalid(e.to_string()).into())
}
