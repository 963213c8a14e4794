//! Kernel orchestration: process/thread lifecycle and the tick loop.
//!
//! This module organizes the simulation around a [`Kernel`], which owns all
//! mutable state and drives everything else:
//!
//! - [`Kernel`] - central orchestrator: creation, killing, sleeping, and the
//!   tick-driven execution loop
//! - [`KernelBuilder`] - fluent API for configuring and creating kernels
//! - [`KernelConfig`] - tunables (completion threshold, memory grant and
//!   capacity, optional disk backing file)
//! - [`SleepEntry`] - a pending wake request keyed by absolute tick
//!
//! # Workflow
//!
//! 1. Build a kernel (optionally via [`Kernel::builder`])
//! 2. Create processes and spawn threads into them
//! 3. Drive simulated time with [`Kernel::run_cycles`]
//! 4. Inspect threads, processes, memory, and files through the read-only
//!    accessors
//!
//! # Example
//!
//! ```rust
//! use coopkern::{Kernel, ThreadPriority, ThreadState};
//!
//! let mut kernel = Kernel::new();
//! kernel.boot();
//!
//! let pid = kernel.create_process("init");
//! kernel.spawn_thread(pid, "worker", ThreadPriority::Low)?;
//! kernel.run_cycles(5);
//!
//! let main = kernel.process(pid).unwrap().threads()[0];
//! assert_eq!(kernel.thread(main).unwrap().state(), ThreadState::Terminated);
//! # Ok::<(), coopkern::Error>(())
//! ```

mod builder;
mod config;
mod execution;

pub use builder::KernelBuilder;
pub use config::{KernelConfig, DEFAULT_COMPLETION_THRESHOLD, DEFAULT_MEMORY_GRANT};
pub use execution::{Kernel, SleepEntry};
