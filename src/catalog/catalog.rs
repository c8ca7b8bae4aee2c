//! System Catalog for PicoDB
//!
//! This module manages the tables of one database handle. Names compare
//! case-insensitively and enumeration follows creation order.

use indexmap::IndexMap;
use tracing::debug;

use super::schema::Column;
use crate::error::{Error, Result};
use crate::storage::allocator::BlockAllocator;
use crate::storage::Table;

/// System Catalog - owns all tables of a handle
#[derive(Debug)]
pub struct Catalog {
    /// Tables keyed by lowercased name, in creation order
    tables: IndexMap<String, Table>,
    /// Table count ceiling
    max_tables: usize,
    /// Longest accepted table name, in characters
    max_name_len: usize,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new(max_tables: usize) -> Self {
        Self {
            tables: IndexMap::with_capacity(max_tables),
            max_tables,
            max_name_len: usize::MAX,
        }
    }

    /// Reject table names longer than `limit` characters
    pub fn with_name_limit(mut self, limit: usize) -> Self {
        self.max_name_len = limit;
        self
    }

    /// Register a new empty table.
    ///
    /// Checks run in order: table count, empty name, name length, duplicate.
    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> Result<&Table> {
        if self.tables.len() >= self.max_tables {
            return Err(Error::TooManyTables(self.max_tables));
        }
        if name.is_empty() {
            return Err(Error::MissingName);
        }
        if name.chars().count() > self.max_name_len {
            return Err(Error::NameTooLong {
                name: name.to_string(),
                limit: self.max_name_len,
            });
        }
        if self.tables.contains_key(&key(name)) {
            return Err(Error::DuplicateTable(name.to_string()));
        }

        debug!(table = name, columns = columns.len(), "creating table");
        let entry = self
            .tables
            .entry(key(name))
            .or_insert_with(|| Table::new(name, columns));
        Ok(entry)
    }

    /// Remove a table and release all of its rows.
    ///
    /// Remaining tables keep their relative order.
    pub fn drop_table(&mut self, name: &str, allocator: &mut dyn BlockAllocator) -> Result<()> {
        if name.is_empty() {
            return Err(Error::MissingName);
        }
        let table = self
            .tables
            .shift_remove(&key(name))
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;

        debug!(table = table.name(), rows = table.row_count(), "dropping table");
        table.release(allocator);
        Ok(())
    }

    /// Find a table by name
    pub fn find(&self, name: &str) -> Option<&Table> {
        self.tables.get(&key(name))
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.find(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Get a mutable table by name
    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(&key(name))
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(&key(name))
    }

    /// Table at `index` in creation order
    pub fn table_at(&self, index: usize) -> Option<&Table> {
        self.tables.get_index(index).map(|(_, table)| table)
    }

    /// List all table names in creation order
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.values().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn max_tables(&self) -> usize {
        self.max_tables
    }

    /// Get table schema info as a formatted string (for .schema command)
    pub fn get_table_info(&self, name: &str) -> Result<String> {
        let table = self.get_table(name)?;
        let mut info = format!("Table: {}\n", table.name());

        if table.columns().is_empty() {
            info.push_str("  (no columns defined)\n");
        }
        for col in table.columns() {
            info.push_str(&format!("  {}\n", col.describe()));
        }
        info.push_str(&format!("  {} row(s)\n", table.row_count()));

        Ok(info)
    }

    /// Release every table
    pub(crate) fn release(&mut self, allocator: &mut dyn BlockAllocator) {
        for (_, table) in self.tables.drain(..) {
            table.release(allocator);
        }
    }
}
