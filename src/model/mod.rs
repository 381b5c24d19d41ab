//! Garden record model.
//!
//! # Data Flow
//! ```text
//! spreadsheet row (Vec<String>)
//!     → ColumnMap (header cell → column index)
//!     → Plant / Location / Container (typed records)
//!     → Record::field (dynamic access for the query engine)
//! ```
//!
//! # Design Decisions
//! - Columns are located by header text, never by position
//! - A blank cell is an absent field
//! - Field names are the snake_case names used by the query API

pub mod container;
pub mod fields;
pub mod location;
pub mod plant;

pub use container::Container;
pub use fields::{ColumnMap, FieldDef, FieldKind, FieldValue, Record, Table};
pub use location::Location;
pub use plant::Plant;
