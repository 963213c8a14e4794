//! Scheduling subsystem: threads, processes, and the dispatch state machine.
//!
//! This module provides the building blocks the kernel schedules over:
//!
//! - [`Thread`] - schedulable unit with identity, priority, program counter,
//!   and lifecycle state
//! - [`ThreadTable`] - arena owning every thread, addressed by stable
//!   [`ThreadId`] handles
//! - [`Process`] - container exclusively owning a set of threads and an
//!   optional memory grant
//! - [`Scheduler`] - two priority-ordered ready queues plus the current
//!   thread, performing strict-priority round-robin dispatch
//!
//! # Handle Model
//!
//! Threads are referenced everywhere by [`ThreadId`] handle, never by owning
//! pointer. The [`ThreadTable`] arena is the single owner; the scheduler's
//! queues, a mutex's wait queue, and a process's thread list are
//! back-references for scheduling and lifecycle purposes only. Lookups are
//! liveness-checked, so a handle that outlives its thread is harmless.
//!
//! # Example
//!
//! ```rust
//! use coopkern::sched::{Scheduler, ThreadPriority, ThreadTable};
//! use coopkern::Pid;
//!
//! let mut threads = ThreadTable::new();
//! let mut scheduler = Scheduler::new();
//!
//! let main = threads.insert(Pid::new(1), "main", ThreadPriority::High);
//! scheduler.add_thread(main, ThreadPriority::High);
//!
//! assert_eq!(scheduler.yield_now(&mut threads), Some(main));
//! ```

mod process;
mod scheduler;
mod table;
mod thread;

pub use process::{Pid, Process};
pub use scheduler::Scheduler;
pub use table::ThreadTable;
pub use thread::{Thread, ThreadId, ThreadPriority, ThreadState};
