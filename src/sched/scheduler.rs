//! Strict-priority cooperative scheduler.
//!
//! This module provides [`Scheduler`], which maintains two FIFO ready queues
//! (one per [`ThreadPriority`] level) plus at most one current thread, and
//! performs the context-switch decision at every dispatch boundary.
//!
//! # Dispatch Policy
//!
//! [`yield_now`](Scheduler::yield_now) implements strict-priority,
//! round-robin-within-priority scheduling:
//!
//! - A High-priority ready thread always wins over every Low-priority one.
//! - Within one priority level, dispatch order is FIFO: a still-runnable
//!   current thread is re-queued at the tail of its level and competes again,
//!   it never retains the processor automatically.
//!
//! # Queue Invariants
//!
//! - A live thread appears in at most one of {current, high queue, low queue}.
//! - A `Blocked` thread appears in none of them; it is held only by whichever
//!   mutex wait queue or sleep list suspended it.
//! - The current thread is `Running` whenever one is present.
//!
//! The scheduler never owns threads. All state transitions go through the
//! [`ThreadTable`] arena, and a dead handle encountered in a queue is simply
//! dropped at the next dispatch that reaches it.

use std::collections::VecDeque;

use super::{ThreadId, ThreadPriority, ThreadState, ThreadTable};

/// Priority-based cooperative scheduler over thread handles.
#[derive(Debug, Default)]
pub struct Scheduler {
    high: VecDeque<ThreadId>,
    low: VecDeque<ThreadId>,
    current: Option<ThreadId>,
}

impl Scheduler {
    /// Creates a scheduler with empty queues and no current thread.
    #[must_use]
    pub fn new() -> Scheduler {
        Scheduler {
            high: VecDeque::new(),
            low: VecDeque::new(),
            current: None,
        }
    }

    /// Enqueues a thread into the ready queue of the given priority level.
    ///
    /// Does not change the thread's state; the caller must have set it to
    /// `Ready` already.
    pub fn add_thread(&mut self, id: ThreadId, priority: ThreadPriority) {
        match priority {
            ThreadPriority::High => self.high.push_back(id),
            ThreadPriority::Low => self.low.push_back(id),
        }
    }

    /// Performs one context-switch decision and returns the new current thread.
    ///
    /// 1. A still-`Running` current thread is set back to `Ready` and
    ///    re-queued at the tail of its priority level (the fairness path).
    /// 2. A `Blocked` or `Terminated` current thread is dropped from scheduler
    ///    tracking; it is owned elsewhere or nowhere.
    /// 3. The next thread is selected with strict priority: high head if any,
    ///    else low head, else no thread is current.
    /// 4. A selected thread is marked `Running`.
    pub fn yield_now(&mut self, threads: &mut ThreadTable) -> Option<ThreadId> {
        if let Some(id) = self.current.take() {
            if let Some(thread) = threads.get_mut(id) {
                if thread.state() == ThreadState::Running {
                    thread.set_state(ThreadState::Ready);
                    self.add_thread(id, thread.priority());
                }
                // Blocked or Terminated: held by a wait queue, or done.
            }
        }

        let next = self.high.pop_front().or_else(|| self.low.pop_front());
        if let Some(id) = next {
            if let Some(thread) = threads.get_mut(id) {
                thread.set_state(ThreadState::Running);
                log::debug!(
                    "context switch: running thread {} [{}] ({})",
                    id,
                    thread.priority(),
                    thread.name()
                );
            }
            self.current = Some(id);
        } else {
            log::trace!("no ready threads");
        }
        self.current
    }

    /// Returns the current thread handle, if one is running.
    #[must_use]
    pub fn current(&self) -> Option<ThreadId> {
        self.current
    }

    /// Sets the current thread's state to `Blocked`.
    ///
    /// The handle stays in `current`: the next [`yield_now`](Scheduler::yield_now)
    /// sees a blocked current, skips re-queuing it, and hands the processor
    /// off. A blocking call must therefore be followed by a dispatch step;
    /// [`MustYield`](crate::sync::MustYield) encodes that contract for mutex
    /// callers.
    pub fn block_current(&mut self, threads: &mut ThreadTable) {
        if let Some(id) = self.current {
            if let Some(thread) = threads.get_mut(id) {
                thread.set_state(ThreadState::Blocked);
            }
        }
    }

    /// Transitions a `Blocked` thread to `Ready` and enqueues it by priority.
    ///
    /// No-op for a dead handle or a thread in any other state, so a wakeup
    /// can never duplicate a queue entry or resurrect a terminated thread.
    pub fn wakeup(&mut self, id: ThreadId, threads: &mut ThreadTable) {
        let Some(thread) = threads.get_mut(id) else {
            return;
        };
        if thread.state() != ThreadState::Blocked {
            return;
        }
        thread.set_state(ThreadState::Ready);
        let priority = thread.priority();
        log::debug!("waking up {} priority thread {}", priority, id);
        self.add_thread(id, priority);
    }

    /// Snapshot of every handle the scheduler tracks, for inspection only.
    ///
    /// Order: current (if any), then the high queue head-to-tail, then the
    /// low queue. Ownership is not affected.
    #[must_use]
    pub fn all_threads(&self) -> Vec<ThreadId> {
        let mut all = Vec::with_capacity(1 + self.high.len() + self.low.len());
        all.extend(self.current);
        all.extend(self.high.iter().copied());
        all.extend(self.low.iter().copied());
        all
    }

    /// Removes a thread handle from scheduler tracking.
    ///
    /// Clears `current` if it matches, otherwise scans both ready queues.
    /// Returns whether a reference was removed. The scheduler does not own
    /// threads: callers must already have detached the handle from its
    /// process before destroying the thread itself.
    pub fn remove_thread(&mut self, id: ThreadId) -> bool {
        if self.current == Some(id) {
            self.current = None;
            return true;
        }
        if let Some(pos) = self.high.iter().position(|&t| t == id) {
            self.high.remove(pos);
            return true;
        }
        if let Some(pos) = self.low.iter().position(|&t| t == id) {
            self.low.remove(pos);
            return true;
        }
        false
    }
}
