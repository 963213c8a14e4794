//! Process container for the simulated kernel.
//!
//! A [`Process`] exclusively owns a set of threads (by handle) and an optional
//! memory-region descriptor obtained from the allocator collaborator at
//! creation time. Destroying a process destroys every thread it holds; the
//! kernel detaches those threads from the scheduler first so no scheduler
//! reference outlives the owner.

use std::fmt;

use crate::memory::MemoryRegion;

use super::ThreadId;

/// Unique process identifier, assigned monotonically by the kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(u32);

impl Pid {
    /// Creates a pid from a raw numeric id.
    #[must_use]
    pub fn new(pid: u32) -> Pid {
        Pid(pid)
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A container that exclusively owns a set of threads and a memory grant.
///
/// The thread sequence preserves insertion order. Thread handles listed here
/// are owned: removing one from the process is the destructive step of the
/// thread's lifecycle (the kernel pairs it with arena removal). The scheduler
/// and mutex wait queues only ever borrow these handles.
#[derive(Debug)]
pub struct Process {
    pid: Pid,
    name: String,
    threads: Vec<ThreadId>,
    memory: Option<MemoryRegion>,
}

impl Process {
    /// Creates a process with no threads and no memory grant.
    ///
    /// ## Arguments
    /// * 'pid' - Unique process id assigned by the kernel
    /// * 'name' - Human-readable process name
    #[must_use]
    pub fn new(pid: Pid, name: &str) -> Process {
        Process {
            pid,
            name: name.to_string(),
            threads: Vec::new(),
            memory: None,
        }
    }

    /// Returns the process id.
    #[must_use]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Returns the process name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the owned thread handles in insertion order.
    #[must_use]
    pub fn threads(&self) -> &[ThreadId] {
        &self.threads
    }

    /// Number of threads owned by this process.
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Returns the memory grant, if the allocator honored one at creation.
    #[must_use]
    pub fn memory(&self) -> Option<MemoryRegion> {
        self.memory
    }

    /// Records the memory grant. Used once at creation time.
    pub fn set_memory(&mut self, region: MemoryRegion) {
        self.memory = Some(region);
    }

    /// Appends a thread handle to the ownership list.
    ///
    /// Duplicate ids are a caller contract violation and are not checked.
    pub fn add_thread(&mut self, id: ThreadId) {
        self.threads.push(id);
    }

    /// Removes the first thread matching `id` from the ownership list.
    ///
    /// Returns whether a handle was found. The caller is responsible for the
    /// paired destructive removal from the thread arena.
    pub fn remove_thread(&mut self, id: ThreadId) -> bool {
        if let Some(pos) = self.threads.iter().position(|&t| t == id) {
            self.threads.remove(pos);
            true
        } else {
            false
        }
    }
}
