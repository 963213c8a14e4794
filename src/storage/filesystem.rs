//! Fixed-slot single-file storage layer.
//!
//! This module provides [`FileSystem`], the storage collaborator of the
//! kernel: a flat-layout filesystem over one [`DiskImage`] arena. Files are
//! simple extents - each inode records a name, a start offset, and a size,
//! and writes always append at the end of the file's extent. There is no
//! directory tree, no deletion, and no extent reuse; the design goal is a
//! minimal open/read/write/close surface with explicit capacity limits.
//!
//! # Capacity Limits
//!
//! Both tables are fixed-slot with explicit capacity checks:
//!
//! - [`MAX_FILES`] inodes - creating a file beyond that reports
//!   [`Error::InodeTableFull`](crate::Error::InodeTableFull)
//! - [`MAX_OPEN_FILES`] descriptors - opening beyond that reports
//!   [`Error::DescriptorTableFull`](crate::Error::DescriptorTableFull)
//! - writes past the disk capacity report
//!   [`Error::DiskFull`](crate::Error::DiskFull)
//!
//! # Example
//!
//! ```rust
//! use coopkern::storage::FileSystem;
//!
//! let mut path = std::env::temp_dir();
//! path.push(format!("coopkern-doc-{}.bin", std::process::id()));
//!
//! let mut fs = FileSystem::open_image(&path, 4096)?;
//! let fd = fs.open("readme.txt")?;
//! fs.write(fd, b"hello")?;
//! fs.close(fd)?;
//!
//! let fd = fs.open("readme.txt")?;
//! assert_eq!(fs.read(fd, 16)?, b"hello");
//! # fs.close(fd)?;
//! # drop(fs);
//! # std::fs::remove_file(path).ok();
//! # Ok::<(), coopkern::Error>(())
//! ```

use std::{fmt, path::Path};

use crate::{memory::MemoryRegion, Error, Result};

use super::DiskImage;

/// Maximum number of files the inode table can hold.
pub const MAX_FILES: usize = 16;

/// Maximum number of simultaneously open descriptors.
pub const MAX_OPEN_FILES: usize = 8;

/// Default disk capacity in bytes.
pub const DEFAULT_DISK_SIZE: usize = 4096;

/// An open-file descriptor handed out by [`FileSystem::open`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fd(usize);

impl Fd {
    /// Returns the raw descriptor index.
    #[must_use]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fd={}", self.0)
    }
}

/// One inode-table entry, for inspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InodeInfo {
    /// Slot index in the inode table.
    pub index: usize,
    /// File name.
    pub name: String,
    /// Extent start offset within the disk image.
    pub offset: usize,
    /// Current file size in bytes.
    pub size: usize,
}

#[derive(Clone, Debug, Default)]
struct Inode {
    name: String,
    offset: usize,
    size: usize,
    in_use: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct OpenFile {
    inode: usize,
    read_pos: usize,
    open: bool,
}

/// Flat-layout filesystem over a single memory-mapped disk image.
pub struct FileSystem {
    disk: DiskImage,
    inodes: Vec<Inode>,
    open_files: Vec<OpenFile>,
    next_free_offset: usize,
}

impl FileSystem {
    /// Creates a filesystem over an already opened disk image.
    #[must_use]
    pub fn new(disk: DiskImage) -> FileSystem {
        log::debug!("filesystem: initialized over {} byte image", disk.len());
        FileSystem {
            disk,
            inodes: vec![Inode::default(); MAX_FILES],
            open_files: vec![OpenFile::default(); MAX_OPEN_FILES],
            next_free_offset: 0,
        }
    }

    /// Opens (creating if necessary) a backing file and builds a filesystem
    /// over it.
    ///
    /// ## Arguments
    /// * 'path' - Host path of the disk backing file
    /// * 'size' - Disk capacity in bytes
    ///
    /// # Errors
    ///
    /// [`Error::FileError`] if the backing file cannot be created or mapped.
    pub fn open_image(path: impl AsRef<Path>, size: usize) -> Result<FileSystem> {
        Ok(FileSystem::new(DiskImage::open(path, size)?))
    }

    /// Opens a file by name, creating it on first reference.
    ///
    /// # Errors
    ///
    /// [`Error::InodeTableFull`] if the file does not exist and every inode
    /// slot is taken; [`Error::DescriptorTableFull`] if no open-file slot is
    /// free.
    pub fn open(&mut self, name: &str) -> Result<Fd> {
        let inode = match self.find_inode(name) {
            Some(index) => index,
            None => {
                let index = self.allocate_inode(name)?;
                log::debug!("filesystem: created file '{}'", name);
                index
            }
        };

        let Some(fd) = self.open_files.iter().position(|slot| !slot.open) else {
            return Err(Error::DescriptorTableFull);
        };
        self.open_files[fd] = OpenFile {
            inode,
            read_pos: 0,
            open: true,
        };
        log::debug!("filesystem: opened '{}' as fd={}", name, fd);
        Ok(Fd(fd))
    }

    /// Appends `data` at the end of the file's extent.
    ///
    /// Returns the number of bytes written (always `data.len()` on success).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDescriptor`] for a closed or out-of-range descriptor;
    /// [`Error::DiskFull`] if the extended extent would exceed the disk
    /// capacity, in which case nothing is written.
    pub fn write(&mut self, fd: Fd, data: &[u8]) -> Result<usize> {
        let slot = self.descriptor(fd)?;
        let inode = &self.inodes[slot.inode];

        let write_at = inode.offset + inode.size;
        if write_at + data.len() > self.disk.len() {
            log::debug!("filesystem: write of {} bytes rejected, disk full", data.len());
            return Err(Error::DiskFull(MemoryRegion::new(write_at, data.len())));
        }
        self.disk.write_at(write_at, data)?;

        let inode = &mut self.inodes[slot.inode];
        inode.size += data.len();
        self.next_free_offset = inode.offset + inode.size;
        log::trace!("filesystem: wrote {} bytes to fd={}", data.len(), fd.value());
        Ok(data.len())
    }

    /// Reads up to `max` bytes from the descriptor's current read position.
    ///
    /// Returns an empty buffer at end-of-data. The read position advances by
    /// the number of bytes returned.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDescriptor`] for a closed or out-of-range descriptor.
    pub fn read(&mut self, fd: Fd, max: usize) -> Result<Vec<u8>> {
        let slot = self.descriptor(fd)?;
        let inode = &self.inodes[slot.inode];

        let remaining = inode.size - slot.read_pos;
        let count = max.min(remaining);
        if count == 0 {
            return Ok(Vec::new());
        }

        let bytes = self.disk.read_at(inode.offset + slot.read_pos, count)?.to_vec();
        self.open_files[fd.value()].read_pos += count;
        log::trace!("filesystem: read {} bytes from fd={}", count, fd.value());
        Ok(bytes)
    }

    /// Closes a descriptor, releasing its slot.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDescriptor`] for a closed or out-of-range descriptor.
    pub fn close(&mut self, fd: Fd) -> Result<()> {
        self.descriptor(fd)?;
        self.open_files[fd.value()].open = false;
        log::debug!("filesystem: closed fd={}", fd.value());
        Ok(())
    }

    /// Snapshot of all in-use inodes, for inspection only.
    #[must_use]
    pub fn inodes(&self) -> Vec<InodeInfo> {
        self.inodes
            .iter()
            .enumerate()
            .filter(|(_, inode)| inode.in_use)
            .map(|(index, inode)| InodeInfo {
                index,
                name: inode.name.clone(),
                offset: inode.offset,
                size: inode.size,
            })
            .collect()
    }

    /// Flushes the disk image to the host backing file.
    ///
    /// # Errors
    ///
    /// [`Error::FileError`] if the flush fails.
    pub fn flush(&self) -> Result<()> {
        self.disk.flush()
    }

    fn find_inode(&self, name: &str) -> Option<usize> {
        self.inodes
            .iter()
            .position(|inode| inode.in_use && inode.name == name)
    }

    fn allocate_inode(&mut self, name: &str) -> Result<usize> {
        let Some(index) = self.inodes.iter().position(|inode| !inode.in_use) else {
            return Err(Error::InodeTableFull);
        };
        self.inodes[index] = Inode {
            name: name.to_string(),
            offset: self.next_free_offset,
            size: 0,
            in_use: true,
        };
        Ok(index)
    }

    fn descriptor(&self, fd: Fd) -> Result<OpenFile> {
        match self.open_files.get(fd.value()) {
            Some(slot) if slot.open => Ok(*slot),
            _ => Err(Error::InvalidDescriptor(fd.value())),
        }
    }
}

impl fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSystem")
            .field("disk_len", &self.disk.len())
            .field("inodes", &self.inodes().len())
            .field("next_free_offset", &self.next_free_offset)
            .finish()
    }
}
