//! Storage module
//!
//! This module contains the in-memory row/table model and the two external
//! collaborators the engine talks to:
//! - Block allocator
//! - Storage backend (filesystem and volatile implementations)

pub mod allocator;
pub mod backend;
pub mod disk;
pub mod memory;
pub mod table;
pub mod tuple;

pub use allocator::{AllocError, Block, BlockAllocator, MemStats, TrackingAllocator};
pub use backend::{FileRef, OpenFlags, StorageBackend};
pub use disk::FileBackend;
pub use memory::MemoryBackend;
pub use table::Table;
pub use tuple::Row;
