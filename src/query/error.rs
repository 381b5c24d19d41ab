//! Query validation errors.

use thiserror::Error;

/// A rejected filter or query request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("request body is required")]
    MissingBody,

    #[error("request body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("unknown operator '{operator}' (supported: {supported})")]
    InvalidOperator { operator: String, supported: String },

    #[error("unknown field '{field}' for {scope} (valid fields: {valid})")]
    InvalidField {
        scope: String,
        field: String,
        valid: String,
    },

    #[error("unknown table '{0}' (valid tables: plants, locations, containers)")]
    InvalidTable(String),

    #[error("unknown response format '{0}' (valid formats: summary, detailed, minimal, ids_only)")]
    InvalidResponseFormat(String),

    #[error("invalid regex '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("invalid limit {value}: must be an integer between 1 and {max}")]
    InvalidLimit { value: String, max: usize },

    #[error("invalid operand for {operator}: {reason}")]
    InvalidOperand { operator: String, reason: String },

    #[error("malformed query: {0}")]
    Malformed(String),
}

impl QueryError {
    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::MissingBody => "missing_body",
            QueryError::InvalidJson(_) => "invalid_json",
            QueryError::InvalidOperator { .. } => "invalid_operator",
            QueryError::InvalidField { .. } => "invalid_field",
            QueryError::InvalidTable(_) => "invalid_table",
            QueryError::InvalidResponseFormat(_) => "invalid_response_format",
            QueryError::InvalidRegex { .. } => "invalid_regex",
            QueryError::InvalidLimit { .. } => "invalid_limit",
            QueryError::InvalidOperand { .. } => "invalid_operand",
            QueryError::Malformed(_) => "malformed_query",
        }
    }
}
