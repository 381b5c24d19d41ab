//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (check per-IP token bucket)
//!     → body limit (DefaultBodyLimit, set in http::server)
//!     → Pass to API handlers
//! ```

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimiterState};
