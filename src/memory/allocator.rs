//! First-fit region allocator over a fixed-size simulated arena.
//!
//! This module provides [`RegionAllocator`], the memory collaborator consumed
//! by the kernel for per-process grants. The allocator manages a contiguous
//! span of simulated RAM as an ordered list of regions, each either free or
//! allocated:
//!
//! - [`allocate`](RegionAllocator::allocate) walks the list first-fit and
//!   splits an oversized free region, handing out a [`MemoryRegion`] handle.
//! - [`deallocate`](RegionAllocator::deallocate) frees the region and
//!   coalesces it with free neighbors in both directions, so fragmentation
//!   never outlives the allocations that caused it.
//!
//! All failure modes (exhaustion, zero-sized requests, unknown handles,
//! double frees) are reported as [`Error`](crate::Error) values, never as
//! panics or undefined behavior.

use crate::{Error, Result};

use std::fmt;

/// Default arena capacity in bytes, matching the 1 KiB of simulated RAM.
pub const DEFAULT_MEMORY_CAPACITY: usize = 1024;

/// A contiguous offset + size span inside the simulated arena.
///
/// Returned by [`RegionAllocator::allocate`] and used as the handle for
/// [`RegionAllocator::deallocate`]. Also recorded on a
/// [`Process`](crate::sched::Process) as its memory grant descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryRegion {
    offset: usize,
    size: usize,
}

impl MemoryRegion {
    /// Creates a region descriptor.
    ///
    /// ## Arguments
    /// * 'offset' - Start of the span within the arena
    /// * 'size' - Length of the span in bytes
    #[must_use]
    pub fn new(offset: usize, size: usize) -> MemoryRegion {
        MemoryRegion { offset, size }
    }

    /// Start of the span within the arena.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the span in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// First offset past the span.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.offset, self.end())
    }
}

/// One entry of the allocator's region list, for inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionInfo {
    /// The span this entry covers.
    pub region: MemoryRegion,
    /// Whether the span is currently free.
    pub free: bool,
}

#[derive(Clone, Copy, Debug)]
struct Block {
    offset: usize,
    size: usize,
    free: bool,
}

/// First-fit allocator with adjacent-free-block coalescing.
#[derive(Debug)]
pub struct RegionAllocator {
    blocks: Vec<Block>,
    capacity: usize,
}

impl RegionAllocator {
    /// Creates an allocator whose arena is one large free region.
    ///
    /// ## Arguments
    /// * 'capacity' - Total arena size in bytes
    #[must_use]
    pub fn new(capacity: usize) -> RegionAllocator {
        log::debug!("memory: initialized with {} bytes", capacity);
        RegionAllocator {
            blocks: vec![Block {
                offset: 0,
                size: capacity,
                free: true,
            }],
            capacity,
        }
    }

    /// Total arena size in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Allocates `size` bytes first-fit.
    ///
    /// The first free region large enough is used; if it is larger than
    /// requested it is split and the remainder stays free.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyAllocation`] for `size == 0`, [`Error::OutOfMemory`]
    /// when no free region is large enough.
    pub fn allocate(&mut self, size: usize) -> Result<MemoryRegion> {
        if size == 0 {
            return Err(Error::EmptyAllocation);
        }

        let Some(pos) = self
            .blocks
            .iter()
            .position(|block| block.free && block.size >= size)
        else {
            log::debug!("memory: allocation of {} bytes failed, arena exhausted", size);
            return Err(Error::OutOfMemory { requested: size });
        };

        let spare = self.blocks[pos].size - size;
        if spare > 0 {
            let remainder = Block {
                offset: self.blocks[pos].offset + size,
                size: spare,
                free: true,
            };
            self.blocks.insert(pos + 1, remainder);
        }

        let block = &mut self.blocks[pos];
        block.size = size;
        block.free = false;

        log::trace!("memory: allocated {} bytes at offset {}", size, block.offset);
        Ok(MemoryRegion::new(block.offset, size))
    }

    /// Frees a previously allocated region and coalesces free neighbors.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] when no block starts at the region's offset,
    /// [`Error::DoubleFree`] when the block is already free. Neither changes
    /// the arena layout.
    pub fn deallocate(&mut self, region: MemoryRegion) -> Result<()> {
        let Some(pos) = self
            .blocks
            .iter()
            .position(|block| block.offset == region.offset())
        else {
            return Err(Error::InvalidRegion(region.offset()));
        };

        if self.blocks[pos].free {
            return Err(Error::DoubleFree(region.offset()));
        }

        self.blocks[pos].free = true;
        log::trace!(
            "memory: freed block at offset {} ({} bytes)",
            self.blocks[pos].offset,
            self.blocks[pos].size
        );

        // Merge with the next block, then with the previous one.
        if pos + 1 < self.blocks.len() && self.blocks[pos + 1].free {
            self.blocks[pos].size += self.blocks[pos + 1].size;
            self.blocks.remove(pos + 1);
        }
        if pos > 0 && self.blocks[pos - 1].free {
            self.blocks[pos - 1].size += self.blocks[pos].size;
            self.blocks.remove(pos);
        }
        Ok(())
    }

    /// Snapshot of the region list in arena order, for inspection only.
    #[must_use]
    pub fn regions(&self) -> Vec<RegionInfo> {
        self.blocks
            .iter()
            .map(|block| RegionInfo {
                region: MemoryRegion::new(block.offset, block.size),
                free: block.free,
            })
            .collect()
    }
}

impl Default for RegionAllocator {
    fn default() -> Self {
        RegionAllocator::new(DEFAULT_MEMORY_CAPACITY)
    }
}
