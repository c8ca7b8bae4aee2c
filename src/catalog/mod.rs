//! Catalog module
//!
//! This module contains the per-handle catalog, column definitions, and data types.

pub mod catalog;
pub mod schema;
pub mod types;

pub use catalog::Catalog;
pub use schema::{Column, DEFAULT_COLUMN_NAME};
pub use types::DataType;
