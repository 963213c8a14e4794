//! Simulated synchronization primitives.
//!
//! Currently a single primitive: [`Mutex`], a binary lock with a FIFO wait
//! queue and Hoare-style ownership handoff. The mutex coordinates with the
//! [`Scheduler`](crate::sched::Scheduler) to block contenders and wake the
//! next waiter on release; the [`MustYield`] token encodes the "a blocking
//! call must be followed by a dispatch step" contract in the type system.

mod mutex;

pub use mutex::{LockOutcome, MustYield, Mutex};
