//! Statement execution module
//!
//! This module applies parsed statements to a handle's catalog and streams
//! selected rows.

pub mod executor;

pub use executor::{
    ExecOutcome, ExecutionEngine, InterruptHandle, ResultRow, RowCallback, SessionState,
};
