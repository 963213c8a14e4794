//! Arena storage for threads with stable integer handles.
//!
//! Every thread in a kernel instance lives in a [`ThreadTable`] slot. The
//! scheduler, mutexes, processes, and the sleep list all hold [`ThreadId`]
//! handles into this arena instead of owning references, which removes any
//! dangling-reference risk when a handle outlives its thread: a lookup
//! through a dead handle returns `None` instead of touching freed state.
//!
//! Handles are assigned monotonically and never reused within one table, so
//! two kernel instances can coexist in tests without their handles aliasing
//! each other's threads by accident.

use super::{Thread, ThreadId, ThreadPriority};

/// Arena of threads indexed by [`ThreadId`].
///
/// Slots are only vacated by [`remove`](ThreadTable::remove), which the
/// kernel invokes on the process-ownership path. All other collaborators go
/// through the liveness-checked [`get`](ThreadTable::get) /
/// [`get_mut`](ThreadTable::get_mut) accessors.
#[derive(Debug, Default)]
pub struct ThreadTable {
    slots: Vec<Option<Thread>>,
}

impl ThreadTable {
    /// Creates an empty table. The first inserted thread receives id 1.
    #[must_use]
    pub fn new() -> ThreadTable {
        ThreadTable { slots: Vec::new() }
    }

    /// Creates a thread in a fresh slot and returns its handle.
    ///
    /// ## Arguments
    /// * 'parent' - Pid of the owning process
    /// * 'name' - Human-readable thread name
    /// * 'priority' - Scheduling priority
    pub fn insert(&mut self, parent: super::Pid, name: &str, priority: ThreadPriority) -> ThreadId {
        let id = ThreadId::new(self.slots.len() as u32 + 1);
        self.slots.push(Some(Thread::new(id, parent, name, priority)));
        id
    }

    /// Returns the live thread behind `id`, or `None` if the handle is dead
    /// or was never issued.
    #[must_use]
    pub fn get(&self, id: ThreadId) -> Option<&Thread> {
        self.slots.get(Self::index(id))?.as_ref()
    }

    /// Mutable counterpart of [`get`](ThreadTable::get).
    #[must_use]
    pub fn get_mut(&mut self, id: ThreadId) -> Option<&mut Thread> {
        self.slots.get_mut(Self::index(id))?.as_mut()
    }

    /// Returns whether `id` refers to a live thread.
    #[must_use]
    pub fn contains(&self, id: ThreadId) -> bool {
        self.get(id).is_some()
    }

    /// Destroys the thread behind `id`, returning it if the slot was live.
    ///
    /// The slot is never reissued; subsequent lookups through the same handle
    /// return `None`.
    pub fn remove(&mut self, id: ThreadId) -> Option<Thread> {
        self.slots.get_mut(Self::index(id))?.take()
    }

    /// Number of live threads in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns whether the table holds no live threads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn index(id: ThreadId) -> usize {
        (id.value() as usize).wrapping_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::Pid;

    #[test]
    fn handles_are_monotonic_from_one() {
        let mut table = ThreadTable::new();
        let a = table.insert(Pid::new(1), "a", ThreadPriority::High);
        let b = table.insert(Pid::new(1), "b", ThreadPriority::Low);

        assert_eq!(a, ThreadId::new(1));
        assert_eq!(b, ThreadId::new(2));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn dead_handle_fails_liveness_check() {
        let mut table = ThreadTable::new();
        let a = table.insert(Pid::new(1), "a", ThreadPriority::High);

        assert!(table.contains(a));
        let removed = table.remove(a).expect("slot was live");
        assert_eq!(removed.name(), "a");

        assert!(!table.contains(a));
        assert!(table.get(a).is_none());
        assert!(table.remove(a).is_none());
    }

    #[test]
    fn removed_slot_is_never_reissued() {
        let mut table = ThreadTable::new();
        let a = table.insert(Pid::new(1), "a", ThreadPriority::High);
        table.remove(a);

        let b = table.insert(Pid::new(1), "b", ThreadPriority::Low);
        assert_ne!(a, b);
        assert_eq!(b, ThreadId::new(2));
    }

    #[test]
    fn unissued_handle_is_rejected() {
        let table = ThreadTable::new();
        assert!(table.get(ThreadId::new(0)).is_none());
        assert!(table.get(ThreadId::new(7)).is_none());
    }
}
