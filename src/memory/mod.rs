//! Simulated memory subsystem.
//!
//! A fixed-size arena managed by [`RegionAllocator`], the collaborator the
//! kernel asks for per-process memory grants. Allocation is first-fit with
//! block splitting; deallocation coalesces adjacent free regions. See
//! [`RegionAllocator`] for the policy details.
//!
//! # Example
//!
//! ```rust
//! use coopkern::memory::RegionAllocator;
//!
//! let mut memory = RegionAllocator::new(1024);
//! let grant = memory.allocate(64)?;
//! assert_eq!(grant.offset(), 0);
//! memory.deallocate(grant)?;
//! # Ok::<(), coopkern::Error>(())
//! ```

mod allocator;

pub use allocator::{MemoryRegion, RegionAllocator, RegionInfo, DEFAULT_MEMORY_CAPACITY};
