//! Data types for PicoDB
//!
//! This module defines the declared column types. Values themselves are
//! always stored text-encoded; the type is schema metadata only.

use std::fmt;

/// Declared column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Integer type
    Integer,
    /// Text type
    Text,
    /// Floating point type
    Real,
    /// Binary data
    Blob,
    /// Null marker type
    Null,
}

impl DataType {
    /// Derive a type from a declared type name using affinity rules:
    /// `INT` anywhere means integer, `CHAR`/`CLOB`/`TEXT` mean text,
    /// `REAL`/`FLOA`/`DOUB` mean real, `BLOB` or nothing means blob.
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("INT") {
            DataType::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            DataType::Text
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            DataType::Real
        } else if upper.trim() == "NULL" {
            DataType::Null
        } else if upper.contains("BLOB") || upper.trim().is_empty() {
            DataType::Blob
        } else {
            // NUMERIC and friends have no distinct storage here.
            DataType::Real
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Real => write!(f, "REAL"),
            DataType::Blob => write!(f, "BLOB"),
            DataType::Null => write!(f, "NULL"),
        }
    }
}
