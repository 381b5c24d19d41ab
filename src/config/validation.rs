//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check the selected store has what it needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GardenConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GardenConfig, StoreBackend};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("rate_limit.burst_size must be at least 1 when rate limiting is enabled")]
    EmptyBurst,

    #[error("store.sheets.spreadsheet_id is required for the sheets backend")]
    MissingSpreadsheetId,

    #[error("store.workbook_path is required for the workbook backend")]
    MissingWorkbookPath,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GardenConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::MustBePositive("timeouts.request_secs"));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::MustBePositive("limits.max_body_bytes"));
    }

    if config.query.max_limit == 0 {
        errors.push(ValidationError::MustBePositive("query.max_limit"));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.requests_per_second == 0 {
            errors.push(ValidationError::MustBePositive("rate_limit.requests_per_second"));
        }
        if config.rate_limit.burst_size == 0 {
            errors.push(ValidationError::EmptyBurst);
        }
    }

    match config.store.backend {
        StoreBackend::Workbook => {
            if config.store.workbook_path.trim().is_empty() {
                errors.push(ValidationError::MissingWorkbookPath);
            }
        }
        StoreBackend::Sheets => {
            if config.store.sheets.spreadsheet_id.trim().is_empty() {
                errors.push(ValidationError::MissingSpreadsheetId);
            }
            if config.store.sheets.timeout_secs == 0 {
                errors.push(ValidationError::MustBePositive("store.sheets.timeout_secs"));
            }
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
