use thiserror::Error;

use crate::memory::MemoryRegion;
use crate::sched::{Pid, ThreadId};

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all failure conditions that can occur while driving the simulated
/// kernel: lifecycle lookups, mutex protocol violations, resource exhaustion in the
/// allocator and filesystem collaborators, and I/O failures from the disk backing file.
/// Each variant provides specific context about the failure mode to enable appropriate
/// error handling.
///
/// Nothing in this crate is fatal to the host process: every failure is local, reported
/// through this type, and recoverable by the caller.
///
/// # Error Categories
///
/// ## Lookup Errors
/// - [`Error::ProcessNotFound`] - Unknown pid on spawn or kill
/// - [`Error::ThreadNotFound`] - Unknown or dead thread handle
///
/// ## Mutex Protocol Violations
/// - [`Error::RecursiveLock`] - Owner re-acquired a lock it already holds
/// - [`Error::NotOwner`] - Unlock attempted by a thread that does not own the lock
///
/// ## Resource Exhaustion
/// - [`Error::OutOfMemory`] - No contiguous free region large enough
/// - [`Error::EmptyAllocation`] - Zero-sized allocation request
/// - [`Error::InvalidRegion`] - Deallocation of a region the allocator never handed out
/// - [`Error::DoubleFree`] - Deallocation of an already-free region
/// - [`Error::DiskFull`] - Write would exceed total disk capacity
/// - [`Error::InodeTableFull`] - All file slots are in use
/// - [`Error::DescriptorTableFull`] - All open-descriptor slots are in use
/// - [`Error::InvalidDescriptor`] - Operation on a closed or out-of-range descriptor
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors from the disk backing file
///
/// # Examples
///
/// ```rust
/// use coopkern::{Error, Kernel};
///
/// let mut kernel = Kernel::builder().build()?;
/// match kernel.spawn_thread(coopkern::Pid::new(42), "worker", coopkern::ThreadPriority::Low) {
///     Ok(tid) => println!("spawned {}", tid),
///     Err(Error::ProcessNotFound(pid)) => eprintln!("no such process: {}", pid),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// # Ok::<(), coopkern::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// No process with the given pid exists.
    ///
    /// Returned when spawning a thread into, or killing, a process that is not
    /// present in the kernel's process table. Never fatal; the caller decides
    /// how to react.
    #[error("No process with pid {0} exists")]
    ProcessNotFound(Pid),

    /// No live thread with the given handle exists.
    ///
    /// Thread handles are stable for the lifetime of a kernel instance, but a
    /// handle outlives its arena slot once the owning process destroys the
    /// thread. Lookups through such a handle report this error instead of
    /// touching a dead slot.
    #[error("No live thread with id {0} exists")]
    ThreadNotFound(ThreadId),

    /// A thread attempted to lock a mutex it already owns.
    ///
    /// Reentrant acquisition is forbidden outright: there is no depth
    /// counter, so accepting the re-lock would let a later second unlock
    /// release the mutex prematurely or mis-hand-off ownership. The operation
    /// is a no-op and the lock state is unchanged.
    #[error("Thread {0} attempted to re-lock a mutex it already owns")]
    RecursiveLock(ThreadId),

    /// A thread attempted to unlock a mutex it does not own.
    ///
    /// This is a protocol violation. The operation is a no-op: `locked`,
    /// `owner`, and the wait queue are all left unchanged.
    #[error("Thread {thread:?} attempted to unlock a mutex owned by {owner:?}")]
    NotOwner {
        /// The thread that issued the unlock, if any was running.
        thread: Option<ThreadId>,
        /// The actual owner of the mutex, if any.
        owner: Option<ThreadId>,
    },

    /// The allocator has no contiguous free region of the requested size.
    ///
    /// First-fit search walked the whole region list without finding a free
    /// block large enough. The arena layout is unchanged.
    #[error("Not enough contiguous memory for {requested} bytes")]
    OutOfMemory {
        /// The number of bytes that was requested.
        requested: usize,
    },

    /// A zero-sized allocation was requested.
    ///
    /// Zero-sized regions cannot be handed out: they would collide with the
    /// offset of whatever is placed after them and could never be freed
    /// unambiguously.
    #[error("Zero-sized allocation requested")]
    EmptyAllocation,

    /// The region passed to deallocate was never handed out by this allocator.
    ///
    /// The associated value is the offset that failed to match any block.
    #[error("No allocated block starts at offset {0}")]
    InvalidRegion(usize),

    /// The region passed to deallocate is already free.
    ///
    /// The associated value is the offset of the block. The free list is
    /// unchanged, in particular no coalescing happens.
    #[error("Double free of block at offset {0}")]
    DoubleFree(usize),

    /// A disk access would fall outside the image.
    ///
    /// The associated region is the offending span. This is a safety check on
    /// the flat byte arena; nothing is read or written when it fires.
    #[error("Disk access out of bounds: {0}")]
    OutOfBounds(MemoryRegion),

    /// A write would exceed the total capacity of the simulated disk.
    ///
    /// The write is not applied, not even partially. The associated region
    /// shows the extent the write would have occupied.
    #[error("Disk full: write would span {0}")]
    DiskFull(MemoryRegion),

    /// Every inode slot is in use; no new file can be created.
    #[error("No free inodes")]
    InodeTableFull,

    /// Every open-file slot is in use; no new descriptor can be handed out.
    #[error("No free file descriptors")]
    DescriptorTableFull,

    /// The descriptor is out of range or not currently open.
    ///
    /// The associated value is the raw descriptor index that was rejected.
    #[error("Invalid file descriptor {0}")]
    InvalidDescriptor(usize),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while creating, mapping, or
    /// flushing the disk backing file.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
