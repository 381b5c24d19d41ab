//! Plant Database API library.

pub mod api;
pub mod config;
pub mod garden;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod query;
pub mod security;
pub mod store;

pub use config::schema::GardenConfig;
pub use garden::Catalog;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
