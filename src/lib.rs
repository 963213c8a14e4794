// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]

//! # coopkern
//!
//! A simulated cooperative multitasking kernel, built in pure Rust. `coopkern`
//! models the coordination core of a tiny operating system - processes owning
//! threads, a strict-priority cooperative scheduler, a blocking mutex with
//! direct ownership handoff, and a tick-driven execution loop with timed
//! sleep/wake - together with two simple resource collaborators: a first-fit
//! memory allocator and a fixed-slot single-file storage layer.
//!
//! ## Features
//!
//! - **Strict-priority scheduling** - Two ready queues with round-robin
//!   fairness inside each priority level
//! - **Hoare-style mutex handoff** - Release transfers ownership directly to
//!   the head waiter, never wake-and-retry
//! - **Tick-driven time** - Deterministic, per-instance tick counter driving
//!   sleep/wake and one-instruction-per-tick execution
//! - **Handle-based ownership** - Threads live in an arena; scheduler, mutex,
//!   and process hold liveness-checked handles, never owning pointers
//! - **Reported failures only** - Exhaustion, protocol violations, and bad
//!   handles are [`Error`] values; nothing panics or aborts the simulation
//!
//! ## Quick Start
//!
//! Add `coopkern` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! coopkern = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use coopkern::prelude::*;
//!
//! let mut kernel = Kernel::new();
//! let pid = kernel.create_process("init");
//! kernel.spawn_thread(pid, "worker", ThreadPriority::Low)?;
//! kernel.run_cycles(5);
//! # Ok::<(), coopkern::Error>(())
//! ```
//!
//! ### Driving the Scheduler Directly
//!
//! The scheduler and mutex can be used without a kernel when a test or tool
//! wants full control over dispatch:
//!
//! ```rust
//! use coopkern::sched::{Scheduler, ThreadPriority, ThreadTable};
//! use coopkern::sync::{LockOutcome, Mutex};
//! use coopkern::Pid;
//!
//! let mut threads = ThreadTable::new();
//! let mut scheduler = Scheduler::new();
//! let mut mutex = Mutex::new();
//!
//! let a = threads.insert(Pid::new(1), "a", ThreadPriority::High);
//! scheduler.add_thread(a, ThreadPriority::High);
//! scheduler.yield_now(&mut threads);
//!
//! assert!(matches!(mutex.lock(&mut scheduler, &mut threads)?, LockOutcome::Acquired));
//! # Ok::<(), coopkern::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `coopkern` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`kernel`] - The [`Kernel`] orchestrator, its builder, and the tick loop
//! - [`sched`] - Threads, processes, the thread arena, and the [`Scheduler`]
//! - [`sync`] - The blocking [`Mutex`](sync::Mutex) with handoff semantics
//! - [`memory`] - First-fit [`RegionAllocator`](memory::RegionAllocator)
//!   collaborator
//! - [`storage`] - Fixed-slot [`FileSystem`](storage::FileSystem) over a
//!   memory-mapped disk image
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ## Execution Model
//!
//! Everything is logically single-threaded: "threads" are schedulable units,
//! not execution parallelism, and the only suspension point is the dispatch
//! step at each tick boundary. Mutexes are simulated application-level locks
//! coordinating those units; they do not protect the kernel's own state,
//! which needs no protection in a single-threaded simulation.
//!
//! Low-priority threads can starve indefinitely while any High-priority
//! thread remains ready. That is a designed property of strict-priority
//! dispatch, not a defect; fairness is only guaranteed within one priority
//! level.

mod error;

pub mod kernel;
pub mod memory;
pub mod prelude;
pub mod sched;
pub mod storage;
pub mod sync;

/// The result type used throughout the crate, wrapping [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;
pub use kernel::{Kernel, KernelBuilder, KernelConfig};
pub use sched::{Pid, Process, Scheduler, Thread, ThreadId, ThreadPriority, ThreadState};
