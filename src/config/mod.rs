//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GardenConfig (validated, immutable)
//!     → handed to the store, server and observability at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    GardenConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig, QueryConfig,
    RateLimitConfig, SheetsConfig, StoreBackend, StoreConfig, TimeoutConfig,
};
