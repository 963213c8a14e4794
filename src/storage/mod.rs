//! Simulated storage subsystem.
//!
//! A fixed-slot, flat-layout filesystem persisted to a single host backing
//! file:
//!
//! - [`DiskImage`] - memory-mapped flat byte arena, the persistence layer
//! - [`FileSystem`] - inode and descriptor tables over the arena, exposing
//!   the open/read/write/close surface the kernel consumes
//!
//! The storage layer is a collaborator of the kernel, not part of its
//! scheduling core: it holds no thread or process state, only bytes.

mod disk;
mod filesystem;

pub use disk::DiskImage;
pub use filesystem::{Fd, FileSystem, InodeInfo, DEFAULT_DISK_SIZE, MAX_FILES, MAX_OPEN_FILES};
