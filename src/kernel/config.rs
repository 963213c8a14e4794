//! Kernel configuration.
//!
//! [`KernelConfig`] controls the tunables of a kernel instance: the
//! instruction-completion threshold of the simulated workload, the size of
//! the per-process memory grant, the capacity of the simulated RAM arena,
//! and the optional disk backing file for the storage collaborator.
//!
//! # Example
//!
//! ```rust
//! use coopkern::kernel::KernelConfig;
//!
//! let config = KernelConfig::new()
//!     .with_completion_threshold(8)
//!     .with_memory_capacity(4096);
//! assert_eq!(config.completion_threshold, 8);
//! ```

use std::path::PathBuf;

use crate::{memory::DEFAULT_MEMORY_CAPACITY, storage::DEFAULT_DISK_SIZE};

/// Number of simulated instructions after which a thread terminates.
pub const DEFAULT_COMPLETION_THRESHOLD: u32 = 5;

/// Default per-process memory grant in bytes.
pub const DEFAULT_MEMORY_GRANT: usize = 64;

/// Configuration for a [`Kernel`](crate::Kernel) instance.
///
/// All fields are public and the struct implements `Default`, so it can be
/// customized either with struct-update syntax or the chainable `with_*`
/// methods.
#[derive(Clone, Debug)]
pub struct KernelConfig {
    /// Program-counter value at which a thread's simulated workload is done
    /// and the thread transitions to `Terminated`.
    ///
    /// The workload model is a placeholder: every tick the running thread
    /// executes exactly one instruction. The scheduling and lifecycle
    /// machinery around it is the actual subject of the simulation.
    pub completion_threshold: u32,

    /// Bytes requested from the allocator for every new process.
    ///
    /// The grant is best-effort: exhaustion leaves the process without a
    /// recorded region but does not fail process creation.
    pub memory_grant: usize,

    /// Total capacity of the simulated RAM arena in bytes.
    pub memory_capacity: usize,

    /// Host path of the disk backing file for the storage collaborator.
    ///
    /// `None` (the default) boots the kernel without storage attached.
    pub disk_path: Option<PathBuf>,

    /// Capacity of the simulated disk in bytes. Only used when
    /// [`disk_path`](KernelConfig::disk_path) is set.
    pub disk_size: usize,
}

impl KernelConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> KernelConfig {
        KernelConfig::default()
    }

    /// Sets the instruction-completion threshold.
    #[must_use]
    pub fn with_completion_threshold(mut self, threshold: u32) -> Self {
        self.completion_threshold = threshold;
        self
    }

    /// Sets the per-process memory grant.
    #[must_use]
    pub fn with_memory_grant(mut self, bytes: usize) -> Self {
        self.memory_grant = bytes;
        self
    }

    /// Sets the simulated RAM capacity.
    #[must_use]
    pub fn with_memory_capacity(mut self, bytes: usize) -> Self {
        self.memory_capacity = bytes;
        self
    }

    /// Attaches a disk backing file of the configured size.
    #[must_use]
    pub fn with_disk(mut self, path: impl Into<PathBuf>) -> Self {
        self.disk_path = Some(path.into());
        self
    }

    /// Sets the simulated disk capacity.
    #[must_use]
    pub fn with_disk_size(mut self, bytes: usize) -> Self {
        self.disk_size = bytes;
        self
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            completion_threshold: DEFAULT_COMPLETION_THRESHOLD,
            memory_grant: DEFAULT_MEMORY_GRANT,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            disk_path: None,
            disk_size: DEFAULT_DISK_SIZE,
        }
    }
}
