//! # coopkern Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! from the crate. Import it to get quick access to the essentials for
//! driving a simulated kernel.
//!
//! ```rust
//! use coopkern::prelude::*;
//!
//! let mut kernel = Kernel::new();
//! let pid = kernel.create_process("init");
//! # let _ = pid;
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all coopkern operations
pub use crate::Error;

/// The result type used throughout coopkern
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Central orchestrator of the simulation
pub use crate::kernel::{Kernel, KernelBuilder, KernelConfig};

// ================================================================================================
// Scheduling
// ================================================================================================

/// Thread and process building blocks
pub use crate::sched::{
    Pid, Process, Scheduler, Thread, ThreadId, ThreadPriority, ThreadState, ThreadTable,
};

// ================================================================================================
// Synchronization
// ================================================================================================

/// Simulated blocking mutex with Hoare-style handoff
pub use crate::sync::{LockOutcome, MustYield, Mutex};

// ================================================================================================
// Collaborators
// ================================================================================================

/// First-fit memory allocator
pub use crate::memory::{MemoryRegion, RegionAllocator};

/// Fixed-slot filesystem over a memory-mapped disk image
pub use crate::storage::{Fd, FileSystem};
