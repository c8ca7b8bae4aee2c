//! Block allocator for PicoDB
//!
//! The engine charges every long-lived structure (handle, catalog slots,
//! row arrays, row values) against a block allocator so that a host with a
//! small fixed memory budget can refuse growth instead of aborting.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Allocation failure
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("allocation of {requested} bytes failed")]
pub struct AllocError {
    pub requested: usize,
}

/// An opaque region handed out by a [`BlockAllocator`]
///
/// Blocks are deliberately neither `Clone` nor `Copy`: whoever holds one
/// owns the region and must hand it back through [`BlockAllocator::free`].
#[derive(Debug, PartialEq, Eq)]
pub struct Block {
    id: u64,
    size: usize,
}

impl Block {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Allocation statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemStats {
    /// Bytes handed out over the allocator's lifetime
    pub total_allocated: usize,
    /// High-water mark of `current_allocated`
    pub peak_allocated: usize,
    /// Bytes currently live
    pub current_allocated: usize,
    /// Successful allocations
    pub allocation_count: usize,
    /// Successful frees
    pub free_count: usize,
}

impl fmt::Display for MemStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory Statistics:")?;
        writeln!(f, "  Total allocated:     {} bytes", self.total_allocated)?;
        writeln!(f, "  Peak allocated:      {} bytes", self.peak_allocated)?;
        writeln!(f, "  Currently allocated: {} bytes", self.current_allocated)?;
        writeln!(f, "  Allocations:         {}", self.allocation_count)?;
        write!(f, "  Frees:               {}", self.free_count)
    }
}

/// Allocator collaborator used by the engine
pub trait BlockAllocator {
    /// Claim a region of `size` bytes; zero-sized requests fail
    fn allocate(&mut self, size: usize) -> Result<Block, AllocError>;

    /// Resize `block` in place of the caller; on failure `block` is untouched
    fn reallocate(&mut self, block: &mut Block, new_size: usize) -> Result<(), AllocError>;

    /// Release a region
    fn free(&mut self, block: Block);

    /// Current statistics
    fn stats(&self) -> MemStats;
}

/// Budgeted accounting allocator
///
/// Tracks live blocks by id; regions are bookkeeping only, the actual bytes
/// live in ordinary Rust containers owned by the engine.
#[derive(Debug)]
pub struct TrackingAllocator {
    budget: usize,
    live: HashMap<u64, usize>,
    next_id: u64,
    stats: MemStats,
}

impl TrackingAllocator {
    /// Create an allocator that refuses to exceed `budget` live bytes
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            live: HashMap::new(),
            next_id: 1,
            stats: MemStats::default(),
        }
    }

    /// Bytes still available under the budget
    pub fn available(&self) -> usize {
        self.budget.saturating_sub(self.stats.current_allocated)
    }

    /// Number of live blocks
    pub fn live_blocks(&self) -> usize {
        self.live.len()
    }
}

impl Default for TrackingAllocator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MEMORY_BUDGET)
    }
}

impl BlockAllocator for TrackingAllocator {
    fn allocate(&mut self, size: usize) -> Result<Block, AllocError> {
        if size == 0 || size > self.available() {
            return Err(AllocError { requested: size });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id, size);

        self.stats.total_allocated += size;
        self.stats.current_allocated += size;
        self.stats.allocation_count += 1;
        self.stats.peak_allocated = self.stats.peak_allocated.max(self.stats.current_allocated);

        Ok(Block { id, size })
    }

    fn reallocate(&mut self, block: &mut Block, new_size: usize) -> Result<(), AllocError> {
        if !self.live.contains_key(&block.id) {
            warn!(block = block.id, "reallocate of unknown block");
            return Err(AllocError {
                requested: new_size,
            });
        }

        // Allocate-copy-free: both regions are live for a moment.
        let fresh = self.allocate(new_size)?;
        let old = std::mem::replace(block, fresh);
        self.free(old);
        Ok(())
    }

    fn free(&mut self, block: Block) {
        match self.live.remove(&block.id) {
            Some(size) => {
                self.stats.current_allocated -= size;
                self.stats.free_count += 1;
            }
            None => warn!(block = block.id, "free of unknown block ignored"),
        }
    }

    fn stats(&self) -> MemStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_free() {
        let mut alloc = TrackingAllocator::new(1024);
        let a = alloc.allocate(100).unwrap();
        let b = alloc.allocate(200).unwrap();
        assert_eq!(alloc.stats().current_allocated, 300);
        assert_eq!(alloc.live_blocks(), 2);

        alloc.free(a);
        alloc.free(b);

        let stats = alloc.stats();
        assert_eq!(stats.current_allocated, 0);
        assert_eq!(stats.peak_allocated, 300);
        assert_eq!(stats.total_allocated, 300);
        assert_eq!(stats.allocation_count, 2);
        assert_eq!(stats.free_count, 2);
    }

    #[test]
    fn test_zero_and_over_budget_fail() {
        let mut alloc = TrackingAllocator::new(64);
        assert_eq!(alloc.allocate(0), Err(AllocError { requested: 0 }));
        assert!(alloc.allocate(65).is_err());
        assert_eq!(alloc.stats().allocation_count, 0);
    }

    #[test]
    fn test_reallocate_keeps_block_on_failure() {
        let mut alloc = TrackingAllocator::new(100);
        let mut block = alloc.allocate(40).unwrap();

        // 40 live + 70 requested exceeds the budget.
        assert!(alloc.reallocate(&mut block, 70).is_err());
        assert_eq!(block.size(), 40);

        alloc.reallocate(&mut block, 60).unwrap();
        assert_eq!(block.size(), 60);
        assert_eq!(alloc.stats().current_allocated, 60);
        assert_eq!(alloc.stats().free_count, 1);

        alloc.free(block);
        assert_eq!(alloc.stats().current_allocated, 0);
    }

    #[test]
    fn test_report_format() {
        let report = MemStats::default().to_string();
        assert!(report.starts_with("Memory Statistics:"));
        assert!(report.contains("Frees:"));
    }
}
