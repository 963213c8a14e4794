//! Thread representation for the simulated kernel.
//!
//! This module provides [`Thread`], the schedulable unit of work, together with
//! its identity handle [`ThreadId`] and the [`ThreadState`] / [`ThreadPriority`]
//! enums that drive scheduling decisions.
//!
//! # Ownership
//!
//! A `Thread` is owned exclusively by the [`ThreadTable`](crate::sched::ThreadTable)
//! arena; its parent [`Process`](crate::sched::Process), the
//! [`Scheduler`](crate::sched::Scheduler) queues, and any
//! [`Mutex`](crate::sync::Mutex) wait queue refer to it only through its
//! [`ThreadId`] handle. Only the owning process path performs destructive
//! removal, so a stale handle can never dangle - lookups through the arena are
//! liveness-checked.
//!
//! # Lifecycle
//!
//! ```text
//! Ready -> Running -> { Ready, Blocked, Terminated }
//! Blocked -> Ready (wakeup) -> Running
//! ```
//!
//! `Terminated` is absorbing: the scheduler drops a terminated current thread
//! from its tracking and never re-queues it.

use std::fmt;

use strum::{Display, EnumIter};

/// Stable handle identifying a thread inside a kernel instance.
///
/// Handles are assigned monotonically starting at 1 and are never reused
/// within one kernel instance, so a handle held after the thread's destruction
/// simply fails the arena's liveness check instead of aliasing a new thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(u32);

impl ThreadId {
    /// Creates a handle from a raw thread id.
    #[must_use]
    pub fn new(id: u32) -> ThreadId {
        ThreadId(id)
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scheduling priority of a thread.
///
/// The scheduler is strictly two-level: a `High` thread that is ready always
/// preempts every `Low` thread at the next dispatch boundary. Within one
/// level, dispatch order is FIFO. Low threads can starve indefinitely while
/// any High thread remains ready; that is an accepted property of the model,
/// not a defect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ThreadPriority {
    /// Dispatched before any ready `Low` thread.
    High,
    /// Dispatched only while no `High` thread is ready.
    Low,
}

/// Lifecycle state of a thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ThreadState {
    /// Eligible to run; sitting in one of the scheduler's ready queues.
    Ready,
    /// Currently holding the simulated processor.
    Running,
    /// Suspended; held only by a mutex wait queue or the sleep list.
    Blocked,
    /// Finished. Absorbing state; never scheduled again.
    Terminated,
}

/// A schedulable unit of work.
///
/// Threads are plain data holders with controlled mutators: the scheduler
/// drives [`state`](Thread::state) through queue transitions, and the kernel
/// advances [`program_counter`](Thread::program_counter) when executing
/// simulated instructions. The program counter is unbounded here; the
/// kernel's completion policy decides when a thread terminates.
#[derive(Debug, Clone)]
pub struct Thread {
    id: ThreadId,
    parent: super::Pid,
    name: String,
    priority: ThreadPriority,
    program_counter: u32,
    state: ThreadState,
}

impl Thread {
    /// Creates a new thread in the `Ready` state with its program counter at 0.
    ///
    /// ## Arguments
    /// * 'id' - Stable handle assigned by the thread table
    /// * 'parent' - Pid of the owning process
    /// * 'name' - Human-readable thread name
    /// * 'priority' - Scheduling priority
    #[must_use]
    pub fn new(id: ThreadId, parent: super::Pid, name: &str, priority: ThreadPriority) -> Thread {
        Thread {
            id,
            parent,
            name: name.to_string(),
            priority,
            program_counter: 0,
            state: ThreadState::Ready,
        }
    }

    /// Returns the thread's stable handle.
    #[must_use]
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Returns the pid of the owning process.
    #[must_use]
    pub fn parent(&self) -> super::Pid {
        self.parent
    }

    /// Returns the thread's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the scheduling priority.
    #[must_use]
    pub fn priority(&self) -> ThreadPriority {
        self.priority
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ThreadState {
        self.state
    }

    /// Returns the simulated instruction pointer.
    #[must_use]
    pub fn program_counter(&self) -> u32 {
        self.program_counter
    }

    /// Sets the lifecycle state.
    pub fn set_state(&mut self, state: ThreadState) {
        self.state = state;
    }

    /// Sets the simulated instruction pointer.
    pub fn set_program_counter(&mut self, pc: u32) {
        self.program_counter = pc;
    }

    /// Advances the simulated instruction pointer by one.
    ///
    /// No bounds are enforced; the kernel's completion threshold decides when
    /// the thread is done.
    pub fn advance_program_counter(&mut self) {
        self.program_counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::Pid;

    #[test]
    fn new_thread_starts_ready_at_pc_zero() {
        let thread = Thread::new(ThreadId::new(1), Pid::new(1), "main", ThreadPriority::High);

        assert_eq!(thread.id(), ThreadId::new(1));
        assert_eq!(thread.parent(), Pid::new(1));
        assert_eq!(thread.name(), "main");
        assert_eq!(thread.priority(), ThreadPriority::High);
        assert_eq!(thread.state(), ThreadState::Ready);
        assert_eq!(thread.program_counter(), 0);
    }

    #[test]
    fn program_counter_mutators() {
        let mut thread = Thread::new(ThreadId::new(3), Pid::new(2), "w", ThreadPriority::Low);

        thread.advance_program_counter();
        thread.advance_program_counter();
        assert_eq!(thread.program_counter(), 2);

        thread.set_program_counter(40);
        thread.advance_program_counter();
        assert_eq!(thread.program_counter(), 41);
    }

    #[test]
    fn state_display_matches_listing_format() {
        assert_eq!(ThreadState::Ready.to_string(), "READY");
        assert_eq!(ThreadState::Terminated.to_string(), "TERMINATED");
        assert_eq!(ThreadPriority::High.to_string(), "HIGH");
        assert_eq!(ThreadPriority::Low.to_string(), "LOW");
    }
}
