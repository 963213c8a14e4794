//! Blocking mutex with direct ownership handoff.
//!
//! This module provides [`Mutex`], a simulated application-level binary lock
//! coordinating with the [`Scheduler`] to block and wake threads. It is not a
//! protection mechanism for the kernel's own data structures - execution is
//! single-threaded and cooperative, so the lock only models contention
//! between simulated threads.
//!
//! # Handoff Semantics
//!
//! Release uses Hoare-style handoff, not Mesa-style wake-and-retry: when the
//! owner unlocks with waiters queued, ownership is assigned to the head
//! waiter *directly*. The waiter is guaranteed the lock on its next run and
//! never competes with a newly arrived contender; `locked` stays true across
//! the transfer.
//!
//! # Blocking Protocol
//!
//! A contended [`lock`](Mutex::lock) blocks the calling thread and returns
//! [`LockOutcome::Blocked`] carrying a [`MustYield`] token. Blocking does not
//! hand off the processor by itself - the scheduler keeps the blocked thread
//! as current until the next dispatch step. The token makes that sequencing
//! contract explicit: it is `#[must_use]`, its only consumer is
//! [`MustYield::complete`], and completing it *is* the dispatch step.
//!
//! # Reentrancy
//!
//! Reentrant acquisition is forbidden loudly: a lock by the current owner
//! reports [`Error::RecursiveLock`] and changes nothing. There is no depth
//! counter, so silently accepting the re-lock would let a later second
//! unlock release the mutex prematurely or mis-hand-off ownership.

use std::collections::VecDeque;

use crate::{
    sched::{Scheduler, ThreadId, ThreadTable},
    Error, Result,
};

/// Proof that a thread just blocked and the processor must be handed off.
///
/// Returned inside [`LockOutcome::Blocked`]. The token cannot be constructed
/// outside this module and is consumed by [`complete`](MustYield::complete),
/// which performs the scheduler's dispatch step. Dropping it unused trips the
/// `#[must_use]` lint, turning a forgotten yield from a silent scheduling bug
/// into a compile-time warning.
#[must_use = "a blocked thread still holds the processor; complete() the token to dispatch"]
#[derive(Debug)]
pub struct MustYield {
    _sealed: (),
}

impl MustYield {
    /// Hands the processor off by performing one dispatch step.
    ///
    /// Returns the thread selected to run next, if any.
    pub fn complete(
        self,
        scheduler: &mut Scheduler,
        threads: &mut ThreadTable,
    ) -> Option<ThreadId> {
        scheduler.yield_now(threads)
    }
}

/// Result of a [`Mutex::lock`] attempt.
#[derive(Debug)]
pub enum LockOutcome {
    /// The lock was acquired; the caller keeps running.
    Acquired,
    /// The lock is held elsewhere; the caller was queued and blocked, and
    /// must hand the processor off via the enclosed token.
    Blocked(MustYield),
    /// No thread is currently running; nothing was done. This is benign,
    /// not an error.
    NoThread,
}

/// A binary lock with a FIFO wait queue and Hoare-style handoff.
///
/// The mutex holds thread handles only; thread state transitions go through
/// the scheduler, which keeps the queue invariants intact (a blocked thread
/// lives in exactly one wait queue and in none of the ready queues).
///
/// # Example
///
/// ```rust
/// use coopkern::sched::{Scheduler, ThreadPriority, ThreadTable};
/// use coopkern::sync::{LockOutcome, Mutex};
/// use coopkern::Pid;
///
/// let mut threads = ThreadTable::new();
/// let mut scheduler = Scheduler::new();
/// let mut mutex = Mutex::new();
///
/// let owner = threads.insert(Pid::new(1), "owner", ThreadPriority::High);
/// scheduler.add_thread(owner, ThreadPriority::High);
/// scheduler.yield_now(&mut threads);
///
/// assert!(matches!(mutex.lock(&mut scheduler, &mut threads)?, LockOutcome::Acquired));
/// assert_eq!(mutex.owner(), Some(owner));
/// mutex.unlock(&mut scheduler, &mut threads)?;
/// # Ok::<(), coopkern::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Mutex {
    locked: bool,
    owner: Option<ThreadId>,
    waiters: VecDeque<ThreadId>,
}

impl Mutex {
    /// Creates an unlocked mutex with an empty wait queue.
    #[must_use]
    pub fn new() -> Mutex {
        Mutex {
            locked: false,
            owner: None,
            waiters: VecDeque::new(),
        }
    }

    /// Returns whether the mutex is currently held.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns the current owner, if the mutex is held.
    #[must_use]
    pub fn owner(&self) -> Option<ThreadId> {
        self.owner
    }

    /// Snapshot of the wait queue, head first. For inspection only.
    #[must_use]
    pub fn waiters(&self) -> Vec<ThreadId> {
        self.waiters.iter().copied().collect()
    }

    /// Attempts to acquire the lock for the scheduler's current thread.
    ///
    /// - No current thread: benign no-op, [`LockOutcome::NoThread`].
    /// - Unlocked: the caller becomes owner, [`LockOutcome::Acquired`].
    /// - Held by another thread: the caller is appended to the FIFO wait
    ///   queue and blocked, [`LockOutcome::Blocked`].
    ///
    /// # Errors
    ///
    /// [`Error::RecursiveLock`] when the caller already owns the mutex; the
    /// lock state is unchanged.
    pub fn lock(
        &mut self,
        scheduler: &mut Scheduler,
        threads: &mut ThreadTable,
    ) -> Result<LockOutcome> {
        let Some(current) = scheduler.current() else {
            return Ok(LockOutcome::NoThread);
        };

        if self.locked && self.owner == Some(current) {
            return Err(Error::RecursiveLock(current));
        }

        if !self.locked {
            self.locked = true;
            self.owner = Some(current);
            log::debug!("mutex: thread {} acquired lock", current);
            return Ok(LockOutcome::Acquired);
        }

        log::debug!(
            "mutex: thread {} blocked waiting for lock (held by {:?})",
            current,
            self.owner
        );
        self.waiters.push_back(current);
        scheduler.block_current(threads);
        Ok(LockOutcome::Blocked(MustYield { _sealed: () }))
    }

    /// Releases the lock held by the scheduler's current thread.
    ///
    /// With waiters queued, ownership transfers directly to the head waiter,
    /// which is woken; `locked` stays true. With an empty queue the mutex is
    /// fully released.
    ///
    /// # Errors
    ///
    /// [`Error::NotOwner`] when the current thread (or the absence of one)
    /// does not match the owner. Protocol violation: no state changes.
    pub fn unlock(&mut self, scheduler: &mut Scheduler, threads: &mut ThreadTable) -> Result<()> {
        let current = scheduler.current();
        if self.owner.is_none() || self.owner != current {
            log::warn!(
                "mutex: thread {:?} tried to unlock mutex owned by {:?}",
                current,
                self.owner
            );
            return Err(Error::NotOwner {
                thread: current,
                owner: self.owner,
            });
        }

        if let Some(next) = self.waiters.pop_front() {
            self.owner = Some(next);
            scheduler.wakeup(next, threads);
            log::debug!("mutex: ownership transferred to thread {}", next);
            // locked stays true: transferred, not released.
        } else {
            self.locked = false;
            self.owner = None;
            log::debug!("mutex: released");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::{Pid, ThreadPriority, ThreadState};

    fn fixture(count: usize) -> (ThreadTable, Scheduler, Vec<ThreadId>) {
        let mut threads = ThreadTable::new();
        let mut scheduler = Scheduler::new();
        let ids = (0..count)
            .map(|i| {
                let id = threads.insert(Pid::new(1), &format!("t{}", i), ThreadPriority::High);
                scheduler.add_thread(id, ThreadPriority::High);
                id
            })
            .collect();
        (threads, scheduler, ids)
    }

    #[test]
    fn uncontended_lock_acquires_immediately() {
        let (mut threads, mut scheduler, ids) = fixture(1);
        let mut mutex = Mutex::new();
        scheduler.yield_now(&mut threads);

        let outcome = mutex.lock(&mut scheduler, &mut threads).unwrap();
        assert!(matches!(outcome, LockOutcome::Acquired));
        assert!(mutex.is_locked());
        assert_eq!(mutex.owner(), Some(ids[0]));
        // The caller keeps running.
        assert_eq!(threads.get(ids[0]).unwrap().state(), ThreadState::Running);
    }

    #[test]
    fn handoff_transfers_ownership_without_retry() {
        let (mut threads, mut scheduler, ids) = fixture(2);
        let (x, y) = (ids[0], ids[1]);
        let mut mutex = Mutex::new();

        // x runs and takes the lock.
        assert_eq!(scheduler.yield_now(&mut threads), Some(x));
        assert!(matches!(
            mutex.lock(&mut scheduler, &mut threads).unwrap(),
            LockOutcome::Acquired
        ));

        // x yields; y runs and contends.
        assert_eq!(scheduler.yield_now(&mut threads), Some(y));
        let LockOutcome::Blocked(token) = mutex.lock(&mut scheduler, &mut threads).unwrap() else {
            panic!("y should block on the held lock");
        };
        assert_eq!(threads.get(y).unwrap().state(), ThreadState::Blocked);
        assert_eq!(mutex.waiters(), vec![y]);

        // y hands the processor off; x runs again and unlocks.
        assert_eq!(token.complete(&mut scheduler, &mut threads), Some(x));
        mutex.unlock(&mut scheduler, &mut threads).unwrap();

        // Ownership moved straight to y: no re-attempted lock() needed.
        assert!(mutex.is_locked());
        assert_eq!(mutex.owner(), Some(y));
        assert_eq!(threads.get(y).unwrap().state(), ThreadState::Ready);
        assert!(mutex.waiters().is_empty());
    }

    #[test]
    fn unlock_by_non_owner_changes_nothing() {
        let (mut threads, mut scheduler, ids) = fixture(2);
        let (x, z) = (ids[0], ids[1]);
        let mut mutex = Mutex::new();

        assert_eq!(scheduler.yield_now(&mut threads), Some(x));
        assert!(matches!(
            mutex.lock(&mut scheduler, &mut threads).unwrap(),
            LockOutcome::Acquired
        ));

        // z runs and tries to unlock a mutex it does not own.
        assert_eq!(scheduler.yield_now(&mut threads), Some(z));
        let err = mutex.unlock(&mut scheduler, &mut threads).unwrap_err();
        assert!(matches!(
            err,
            Error::NotOwner {
                thread: Some(thread),
                owner: Some(owner),
            } if thread == z && owner == x
        ));
        assert!(mutex.is_locked());
        assert_eq!(mutex.owner(), Some(x));
    }

    #[test]
    fn recursive_lock_is_rejected_loudly() {
        let (mut threads, mut scheduler, ids) = fixture(1);
        let mut mutex = Mutex::new();
        scheduler.yield_now(&mut threads);

        assert!(matches!(
            mutex.lock(&mut scheduler, &mut threads).unwrap(),
            LockOutcome::Acquired
        ));
        let err = mutex.lock(&mut scheduler, &mut threads).unwrap_err();
        assert!(matches!(err, Error::RecursiveLock(id) if id == ids[0]));

        // State unchanged: still locked by the same owner, no waiters.
        assert_eq!(mutex.owner(), Some(ids[0]));
        assert!(mutex.waiters().is_empty());
        assert_eq!(threads.get(ids[0]).unwrap().state(), ThreadState::Running);
    }

    #[test]
    fn operations_without_a_current_thread_are_benign() {
        let mut threads = ThreadTable::new();
        let mut scheduler = Scheduler::new();
        let mut mutex = Mutex::new();

        let outcome = mutex.lock(&mut scheduler, &mut threads).unwrap();
        assert!(matches!(outcome, LockOutcome::NoThread));
        assert!(!mutex.is_locked());

        // Unlocking with no current thread is a protocol violation, reported
        // without state change.
        assert!(mutex.unlock(&mut scheduler, &mut threads).is_err());
    }

    #[test]
    fn fifo_order_among_multiple_waiters() {
        let (mut threads, mut scheduler, ids) = fixture(3);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        let mut mutex = Mutex::new();

        assert_eq!(scheduler.yield_now(&mut threads), Some(a));
        assert!(matches!(
            mutex.lock(&mut scheduler, &mut threads).unwrap(),
            LockOutcome::Acquired
        ));

        assert_eq!(scheduler.yield_now(&mut threads), Some(b));
        let LockOutcome::Blocked(token) = mutex.lock(&mut scheduler, &mut threads).unwrap() else {
            panic!("b should block");
        };
        assert_eq!(token.complete(&mut scheduler, &mut threads), Some(c));
        let LockOutcome::Blocked(token) = mutex.lock(&mut scheduler, &mut threads).unwrap() else {
            panic!("c should block");
        };
        assert_eq!(token.complete(&mut scheduler, &mut threads), Some(a));

        assert_eq!(mutex.waiters(), vec![b, c]);

        // First release hands off to b, the earliest waiter.
        mutex.unlock(&mut scheduler, &mut threads).unwrap();
        assert_eq!(mutex.owner(), Some(b));
        assert_eq!(mutex.waiters(), vec![c]);
    }
}
