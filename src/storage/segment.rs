//! One fixed-capacity, append-only region backed by an anonymous temp file.

use std::fs::File;
use std::path::Path;

use memmap2::{MmapMut, MmapOptions};

use super::error::StorageError;

pub(crate) struct Segment {
    // never read through after creation; writes go through `base`
    _mmap: MmapMut,
    _file: File,
    base: *mut u8,
    capacity: usize,
    high_water_mark: usize,
}

// `base` points into `_mmap`, which is owned by the segment and never remapped.
unsafe impl Send for Segment {}

impl Segment {
    /// Create and map a zero-filled segment file in `dir`.
    ///
    /// The file is unlinked on creation, so it disappears with the mapping.
    pub(crate) fn create(dir: &Path, capacity: usize) -> Result<Self, StorageError> {
        let file = tempfile::tempfile_in(dir)?;
        file.set_len(capacity as u64)?;
        let mut mmap = unsafe { MmapOptions::new().len(capacity).map_mut(&file)? };
        let base = mmap.as_mut_ptr();
        Ok(Self {
            _mmap: mmap,
            _file: file,
            base,
            capacity,
            high_water_mark: 0,
        })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// Offset at which `len` bytes aligned to `align` would be placed, if they fit
    pub(crate) fn reserve(&self, len: usize, align: usize) -> Option<usize> {
        let start = self.high_water_mark.checked_add(align - 1)? / align * align;
        let end = start.checked_add(len)?;
        (end <= self.capacity).then_some(start)
    }

    /// Copy `bytes` to `offset` and advance the high-water mark past them.
    ///
    /// Returns a pointer to the copied bytes, valid for as long as the segment.
    ///
    /// # Safety
    ///
    /// `offset` must come from [`reserve`](Self::reserve) for `bytes.len()`
    /// on the current high-water mark, so the target region is in bounds and
    /// not covered by any earlier write.
    pub(crate) unsafe fn append(&mut self, offset: usize, bytes: &[u8]) -> *const u8 {
        debug_assert!(offset >= self.high_water_mark);
        debug_assert!(offset + bytes.len() <= self.capacity);
        let dst = self.base.add(offset);
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
        self.high_water_mark = offset + bytes.len();
        dst as *const u8
    }
}
