//! Engine configuration
//!
//! Capacity ceilings and retained tuning values for a database handle.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of cached pages (retained, not acted upon)
pub const DEFAULT_CACHE_SIZE: usize = 100;
/// Default page size in bytes (retained, not acted upon)
pub const DEFAULT_PAGE_SIZE: usize = 512;
/// Default allocator budget: the 4 MiB a small host typically leaves us
pub const DEFAULT_MEMORY_BUDGET: usize = 4 * 1024 * 1024;

/// Configuration for a database handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of tables in the catalog
    pub max_tables: usize,
    /// Maximum number of columns per table
    pub max_columns: usize,
    /// Maximum number of rows per table
    pub max_rows: usize,
    /// Row slots reserved by the first insert into a table
    pub initial_row_capacity: usize,
    /// Maximum table name length in characters
    pub max_table_name_len: usize,
    /// Maximum column name length in characters
    pub max_column_name_len: usize,
    /// Maximum statement length in bytes
    pub max_sql_length: usize,
    /// Initial `cache_size` pragma value
    pub cache_size: usize,
    /// Initial `page_size` pragma value
    pub page_size: usize,
    /// Byte budget for the default tracking allocator
    pub memory_budget: usize,
    /// Parse CREATE TABLE column lists into real column definitions
    pub declared_columns: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_tables: 32,
            max_columns: 16,
            max_rows: 1000,
            initial_row_capacity: 10,
            max_table_name_len: 64,
            max_column_name_len: 32,
            max_sql_length: 10_000,
            cache_size: DEFAULT_CACHE_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            memory_budget: DEFAULT_MEMORY_BUDGET,
            declared_columns: false,
        }
    }
}

impl Config {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON config file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: Config =
            serde_json::from_str(&json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the maximum table count
    pub fn max_tables(mut self, max_tables: usize) -> Self {
        self.max_tables = max_tables;
        self
    }

    /// Set the maximum row count per table
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Set the initial row capacity
    pub fn initial_row_capacity(mut self, capacity: usize) -> Self {
        self.initial_row_capacity = capacity;
        self
    }

    /// Set the allocator budget
    pub fn memory_budget(mut self, bytes: usize) -> Self {
        self.memory_budget = bytes;
        self
    }

    /// Enable or disable column list parsing
    pub fn declared_columns(mut self, enabled: bool) -> Self {
        self.declared_columns = enabled;
        self
    }

    /// Check the ceilings are usable
    pub fn validate(&self) -> Result<()> {
        let ceilings = [
            ("max_tables", self.max_tables),
            ("max_columns", self.max_columns),
            ("max_rows", self.max_rows),
            ("initial_row_capacity", self.initial_row_capacity),
            ("max_table_name_len", self.max_table_name_len),
            ("max_column_name_len", self.max_column_name_len),
            ("max_sql_length", self.max_sql_length),
        ];
        for (name, value) in ceilings {
            if value == 0 {
                return Err(Error::Config(format!("{} must be greater than zero", name)));
            }
        }
        if self.initial_row_capacity > self.max_rows {
            return Err(Error::Config(format!(
                "initial_row_capacity ({}) exceeds max_rows ({})",
                self.initial_row_capacity, self.max_rows
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.max_tables, 32);
        assert_eq!(config.max_rows, 1000);
        assert_eq!(config.page_size, 512);
        assert!(!config.declared_columns);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_ceilings() {
        assert!(matches!(
            Config::new().max_rows(0).validate(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::new().max_rows(4).initial_row_capacity(8).validate(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_rows": 50, "declared_columns": true }}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.max_rows, 50);
        assert!(config.declared_columns);
        assert_eq!(config.max_tables, 32);
    }

    #[test]
    fn test_from_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(Error::Config(_))
        ));
    }
}
