//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP layer, query engine, rate limiter, store
//!     → logging.rs (tracing subscriber: pretty or JSON)
//!     → metrics.rs (counters and histograms, optional Prometheus scrape)
//!     → tracing.rs (per-request spans carrying the request ID)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows into every request span
//! - Metric macros are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
pub mod tracing;
