//! Table storage for PicoDB
//!
//! A table owns its column definitions and every row inserted into it. Row
//! slots grow geometrically (doubling from a small initial capacity) up to the
//! configured ceiling.

use std::mem::size_of;

use tracing::debug;

use super::allocator::{Block, BlockAllocator};
use super::tuple::Row;
use crate::catalog::Column;
use crate::config::Config;
use crate::error::{Error, Result};

/// Bytes charged per reserved row slot
pub const ROW_SLOT_BYTES: usize = size_of::<Row>();

/// An in-memory table
#[derive(Debug)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    /// Reserved row slots
    capacity: usize,
    /// Accounting for the row slot array
    slots: Option<Block>,
}

impl Table {
    /// Create an empty table
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
            capacity: 0,
            slots: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Reserved row slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a row.
    ///
    /// A table without columns first gains the single materialized text
    /// column. On error the table's columns and rows are unchanged.
    pub fn insert_row(
        &mut self,
        values: Vec<Option<String>>,
        allocator: &mut dyn BlockAllocator,
        config: &Config,
    ) -> Result<()> {
        let materialize = self.columns.is_empty();
        let width = if materialize { 1 } else { self.columns.len() };

        if self.rows.len() >= config.max_rows {
            return Err(Error::TooManyRows {
                table: self.name.clone(),
                limit: config.max_rows,
            });
        }

        let row = Row::build(values, width, allocator)?;
        if let Err(e) = self.reserve_slot(allocator, config) {
            row.release(allocator);
            return Err(e);
        }

        if materialize {
            debug!(table = %self.name, "materializing default column");
            self.columns.push(Column::materialized());
        }
        self.rows.push(row);
        Ok(())
    }

    /// Make room for one more row, doubling the slot array when full
    ///
    /// Leaves `capacity` and the slot block untouched on failure.
    fn reserve_slot(&mut self, allocator: &mut dyn BlockAllocator, config: &Config) -> Result<()> {
        if self.rows.len() < self.capacity {
            return Ok(());
        }

        let new_capacity = if self.capacity == 0 {
            config.initial_row_capacity
        } else {
            self.capacity * 2
        }
        .min(config.max_rows)
        .max(self.rows.len() + 1);

        self.rows
            .try_reserve_exact(new_capacity - self.rows.len())
            .map_err(|_| Error::OutOfMemory)?;

        let bytes = new_capacity * ROW_SLOT_BYTES;
        match self.slots.as_mut() {
            Some(block) => allocator.reallocate(block, bytes)?,
            None => self.slots = Some(allocator.allocate(bytes)?),
        }

        debug!(table = %self.name, from = self.capacity, to = new_capacity, "grew row slots");
        self.capacity = new_capacity;
        Ok(())
    }

    /// Release every row and the slot array
    pub(crate) fn release(self, allocator: &mut dyn BlockAllocator) {
        for row in self.rows {
            row.release(allocator);
        }
        if let Some(block) = self.slots {
            allocator.free(block);
        }
    }
}
