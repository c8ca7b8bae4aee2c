//! Error types for PicoDB
//!
//! This module defines all error types used throughout the statement engine,
//! together with the numeric status codes reported to callers.

use std::fmt;

use thiserror::Error;

use crate::storage::allocator::AllocError;

/// The main error type for PicoDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Resource Errors ==========
    #[error("Out of memory")]
    OutOfMemory,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot open/create database file '{0}'")]
    CannotOpen(String),

    #[error("Database not open")]
    NotOpen,

    // ========== Catalog Errors ==========
    #[error("Too many tables (limit {0})")]
    TooManyTables(usize),

    #[error("Table '{0}' already exists")]
    DuplicateTable(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Missing table name")]
    MissingName,

    #[error("Name '{name}' exceeds {limit} characters")]
    NameTooLong { name: String, limit: usize },

    #[error("Too many columns (limit {0})")]
    TooManyColumns(usize),

    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    // ========== Execution Errors ==========
    #[error("Too many rows in table '{table}' (limit {limit})")]
    TooManyRows { table: String, limit: usize },

    #[error("Syntax error: {0}")]
    SyntaxError(String),

    #[error("Query aborted by callback")]
    Aborted,

    #[error("Interrupted")]
    Interrupted,

    // ========== Storage Errors ==========
    #[error("File '{0}' not found")]
    FileNotFound(String),

    #[error("Invalid file reference {0}")]
    BadFileRef(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ========== Configuration Errors ==========
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<AllocError> for Error {
    fn from(_: AllocError) -> Self {
        Error::OutOfMemory
    }
}

impl Error {
    /// Status code reported alongside this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::OutOfMemory => StatusCode::NoMem,
            Error::Aborted | Error::Interrupted => StatusCode::Abort,
            Error::Io(_) | Error::BadFileRef(_) => StatusCode::IoErr,
            _ => StatusCode::Error,
        }
    }
}

/// Result type alias for PicoDB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric status codes, compatible with the classic embedded SQL engine codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StatusCode {
    Ok = 0,
    Error = 1,
    Internal = 2,
    Perm = 3,
    Abort = 4,
    Busy = 5,
    Locked = 6,
    NoMem = 7,
    ReadOnly = 8,
    IoErr = 9,
}

impl StatusCode {
    /// Status of a completed operation
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => StatusCode::Ok,
            Err(e) => e.status(),
        }
    }

    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Ok => "OK",
            StatusCode::Error => "ERROR",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Perm => "PERM",
            StatusCode::Abort => "ABORT",
            StatusCode::Busy => "BUSY",
            StatusCode::Locked => "LOCKED",
            StatusCode::NoMem => "NOMEM",
            StatusCode::ReadOnly => "READONLY",
            StatusCode::IoErr => "IOERR",
        };
        write!(f, "{} ({})", name, *self as i32)
    }
}
