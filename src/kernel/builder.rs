//! Fluent builder for kernel instances.
//!
//! [`KernelBuilder`] is the configuration front of [`Kernel`]: chain the
//! setters you care about and call [`build`](KernelBuilder::build). Building
//! is fallible only when a disk backing file is attached, since mapping it
//! touches the host filesystem.
//!
//! # Example
//!
//! ```rust
//! use coopkern::Kernel;
//!
//! let mut kernel = Kernel::builder()
//!     .completion_threshold(3)
//!     .memory_capacity(2048)
//!     .build()?;
//!
//! let pid = kernel.create_process("init");
//! kernel.run_cycles(3);
//! # let _ = pid;
//! # Ok::<(), coopkern::Error>(())
//! ```

use std::path::PathBuf;

use crate::Result;

use super::{Kernel, KernelConfig};

/// Fluent API for configuring and creating a [`Kernel`].
#[derive(Debug, Default)]
pub struct KernelBuilder {
    config: KernelConfig,
}

impl KernelBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> KernelBuilder {
        KernelBuilder {
            config: KernelConfig::new(),
        }
    }

    /// Starts from an existing configuration.
    #[must_use]
    pub fn with_config(config: KernelConfig) -> KernelBuilder {
        KernelBuilder { config }
    }

    /// Sets the instruction-completion threshold.
    #[must_use]
    pub fn completion_threshold(mut self, threshold: u32) -> Self {
        self.config.completion_threshold = threshold;
        self
    }

    /// Sets the per-process memory grant in bytes.
    #[must_use]
    pub fn memory_grant(mut self, bytes: usize) -> Self {
        self.config.memory_grant = bytes;
        self
    }

    /// Sets the simulated RAM capacity in bytes.
    #[must_use]
    pub fn memory_capacity(mut self, bytes: usize) -> Self {
        self.config.memory_capacity = bytes;
        self
    }

    /// Attaches a disk backing file for the storage collaborator.
    #[must_use]
    pub fn disk(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.disk_path = Some(path.into());
        self
    }

    /// Sets the simulated disk capacity in bytes.
    #[must_use]
    pub fn disk_size(mut self, bytes: usize) -> Self {
        self.config.disk_size = bytes;
        self
    }

    /// Builds the kernel.
    ///
    /// # Errors
    ///
    /// [`Error::FileError`](crate::Error::FileError) if a disk backing file
    /// is configured and cannot be created or mapped.
    pub fn build(self) -> Result<Kernel> {
        Kernel::with_config(self.config)
    }
}
