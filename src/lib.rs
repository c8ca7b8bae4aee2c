//! PicoDB - a minimal embeddable relational data store
//!
//! This library provides a small statement engine for memory-constrained
//! hosts:
//! - Statement classification and parsing
//! - In-memory tables with a per-handle catalog
//! - Execution with streamed results
//! - Pluggable block allocator and storage backend
//! - An interactive shell front end

pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod shell;
pub mod sql;
pub mod storage;

pub use config::Config;
pub use database::Database;
pub use error::{Error, Result, StatusCode};
pub use executor::{ExecOutcome, InterruptHandle, ResultRow, RowCallback};
pub use sql::StatementKind;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
