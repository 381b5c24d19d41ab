//! Field filters, operators and the plant query engine.
//!
//! # Data Flow
//! ```text
//! URL params (GET /api/garden/filter) ─┐
//! JSON body (POST /api/garden/query) ──┴→ engine.rs (GardenQuery)
//!     → filter.rs (per-table conditions, operator.rs)
//!     → select plants, narrow placements to matching locations/containers
//!     → format.rs (summary | detailed | minimal | ids_only)
//!     → QueryOutcome envelope
//! ```
//!
//! # Design Decisions
//! - Validation happens entirely before execution; a query either runs
//!   in full or fails with a `QueryError`
//! - Filters on different tables intersect through the plant hierarchy

pub mod engine;
pub mod error;
pub mod filter;
pub mod format;
pub mod operator;

pub use engine::{execute, parse_limit, GardenQuery, QueryOutcome};
pub use error::QueryError;
pub use filter::{FieldFilter, TableFilter};
pub use format::ResponseFormat;
pub use operator::{Condition, Operator};
