//! Row representation for PicoDB
//!
//! A row is an ordered sequence of nullable, text-encoded values whose
//! storage is charged against the handle's block allocator.

use std::mem::size_of;

use super::allocator::{Block, BlockAllocator};
use crate::error::Result;

/// A stored row
#[derive(Debug)]
pub struct Row {
    values: Vec<Option<String>>,
    /// Accounting for the value slots and their text
    block: Block,
}

impl Row {
    /// Build a row exactly `width` values wide: extra values are dropped,
    /// missing trailing values are null.
    pub(crate) fn build(
        mut values: Vec<Option<String>>,
        width: usize,
        allocator: &mut dyn BlockAllocator,
    ) -> Result<Self> {
        values.truncate(width);
        values.resize(width, None);

        let block = allocator.allocate(footprint(&values))?;
        Ok(Self { values, block })
    }

    /// All values in column order
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// Value at `index`, `None` for null or out of range
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bytes charged for this row
    pub fn footprint(&self) -> usize {
        self.block.size()
    }

    pub(crate) fn release(self, allocator: &mut dyn BlockAllocator) {
        allocator.free(self.block);
    }
}

/// Bytes a row with these values occupies: one slot per value plus each
/// present string and its terminator.
fn footprint(values: &[Option<String>]) -> usize {
    let slots = values.len() * size_of::<Option<String>>();
    let text: usize = values.iter().flatten().map(|s| s.len() + 1).sum();
    slots + text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::allocator::TrackingAllocator;

    fn text(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_build_pads_and_truncates() {
        let mut alloc = TrackingAllocator::new(4096);

        let row = Row::build(vec![text("a")], 3, &mut alloc).unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row.get(0), Some("a"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(2), None);

        let row = Row::build(vec![text("a"), text("b"), text("c")], 2, &mut alloc).unwrap();
        assert_eq!(row.values(), &[text("a"), text("b")]);
    }

    #[test]
    fn test_footprint_charged_and_released() {
        let mut alloc = TrackingAllocator::new(4096);
        let row = Row::build(vec![text("Alice"), None], 2, &mut alloc).unwrap();

        let expected = 2 * size_of::<Option<String>>() + 6;
        assert_eq!(row.footprint(), expected);
        assert_eq!(alloc.stats().current_allocated, expected);

        row.release(&mut alloc);
        assert_eq!(alloc.stats().current_allocated, 0);
    }

    #[test]
    fn test_build_out_of_memory() {
        let mut alloc = TrackingAllocator::new(8);
        assert!(Row::build(vec![text("too large for budget")], 1, &mut alloc).is_err());
    }
}
