//! Memory-mapped disk image backing the simulated filesystem.
//!
//! This module provides [`DiskImage`], a fixed-size flat byte arena persisted
//! to a backing file on the host. The image is memory-mapped read-write, so
//! filesystem writes land in the mapping directly and reach the host file on
//! flush. The content is opaque at this layer: the inode bookkeeping lives in
//! [`FileSystem`](crate::storage::FileSystem), the image only offers
//! bounds-checked reads and writes at byte offsets.

use std::{fs::OpenOptions, path::Path};

use memmap2::MmapMut;

use crate::{memory::MemoryRegion, Error, Result};

/// Fixed-size byte arena persisted to a host backing file.
///
/// Created with a target size; a missing backing file is created and
/// zero-filled, an existing one is truncated or extended to the target size
/// before mapping. All access goes through bounds-checked offset operations.
#[derive(Debug)]
pub struct DiskImage {
    map: MmapMut,
}

impl DiskImage {
    /// Opens (creating if necessary) the backing file and maps it read-write.
    ///
    /// ## Arguments
    /// * 'path' - Host path of the backing file
    /// * 'size' - Disk capacity in bytes; the file is sized to match
    ///
    /// # Errors
    ///
    /// [`Error::FileError`] if the file cannot be created, sized, or mapped.
    pub fn open(path: impl AsRef<Path>, size: usize) -> Result<DiskImage> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.set_len(size as u64)?;

        let map = unsafe { MmapMut::map_mut(&file) }?;
        Ok(DiskImage { map })
    }

    /// Disk capacity in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns whether the disk has zero capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.len() == 0
    }

    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the span does not fit the image.
    pub fn read_at(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let span = MemoryRegion::new(offset, len);
        let Some(end) = offset.checked_add(len) else {
            return Err(Error::OutOfBounds(span));
        };
        if end > self.map.len() {
            return Err(Error::OutOfBounds(span));
        }
        Ok(&self.map[offset..end])
    }

    /// Writes `data` starting at `offset`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the span does not fit the image; nothing is
    /// written in that case.
    pub fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let span = MemoryRegion::new(offset, data.len());
        let Some(end) = offset.checked_add(data.len()) else {
            return Err(Error::OutOfBounds(span));
        };
        if end > self.map.len() {
            return Err(Error::OutOfBounds(span));
        }
        self.map[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Flushes the mapping to the host backing file.
    ///
    /// # Errors
    ///
    /// [`Error::FileError`] if the flush fails.
    pub fn flush(&self) -> Result<()> {
        self.map.flush()?;
        Ok(())
    }
}
