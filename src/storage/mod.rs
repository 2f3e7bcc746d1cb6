//! # Off-Heap Storage
//!
//! Append-only arena for long-lived numeric arrays, backed by memory-mapped
//! anonymous temp files.
//!
//! ## Design
//!
//! 1. **Segments**: a [`Storage`] owns fixed-capacity segments, created
//!    lazily. Each is a temp file that is unlinked right away and mapped
//!    read-write, so it vanishes when the storage is dropped (or the process
//!    exits).
//!
//! 2. **Append-only**: arrays are copied to the tail of the current segment.
//!    When the tail has no room, a new segment is started; values never span
//!    segments, so a single array larger than one segment is rejected.
//!
//! 3. **Borrowed views**: [`Storage::store`] returns a [`View`] that borrows
//!    the storage. The borrow checker guarantees no view outlives the mapping.
//!
//! 4. **RAM mode**: with [`StorageConfig::store_in_ram`] set,
//!    [`Storage::acquire`] yields `None` and callers keep their heap arrays,
//!    see [`store_or_keep`].
//!
//! ```rust
//! use mzmerge::storage::{Storage, StorageConfig};
//!
//! let storage = Storage::acquire(&StorageConfig::with_segment_capacity(4096))?
//!     .expect("mapped storage");
//! let mzs = storage.store(&[100.0f64, 200.0, 300.0])?;
//! assert_eq!(&*mzs, &[100.0, 200.0, 300.0]);
//! # Ok::<(), mzmerge::storage::StorageError>(())
//! ```

mod config;
mod error;
mod segment;
mod view;


use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

pub use config::StorageConfig;
pub use error::StorageError;
pub use view::{StoredArray, View};

use segment::Segment;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f64 {}
    impl Sealed for f32 {}
    impl Sealed for i32 {}
}

/// Element types that can be stored: `f64`, `f32` and `i32`
pub trait StorableValue: bytemuck::Pod + Send + Sync + sealed::Sealed {}

impl StorableValue for f64 {}
impl StorableValue for f32 {}
impl StorableValue for i32 {}

/// Usage statistics of a [`Storage`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Segments created
    pub segments: usize,
    /// Arrays stored (empty arrays are not counted)
    pub arrays_stored: usize,
    /// Bytes of array data written
    pub bytes_used: u64,
    /// Bytes mapped across all segments
    pub bytes_reserved: u64,
}

impl fmt::Display for StorageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stored {} arrays ({} bytes) in {} segment(s), {} bytes mapped",
            self.arrays_stored, self.bytes_used, self.segments, self.bytes_reserved
        )
    }
}

struct Inner {
    segments: Vec<Segment>,
    arrays_stored: usize,
    bytes_used: u64,
}

/// Arena of memory-mapped segments handing out borrowed [`View`]s.
///
/// `store` takes `&self`; allocation is serialized by an internal mutex, so a
/// storage can be shared between threads.
pub struct Storage {
    inner: Mutex<Inner>,
    segment_capacity: usize,
    segment_dir: PathBuf,
}

impl Storage {
    /// Acquire storage for `config`.
    ///
    /// Returns `Ok(None)` when the configuration asks to keep values in RAM.
    /// The decision is taken here, once; later calls on the returned storage
    /// do not look at the configuration again.
    pub fn acquire(config: &StorageConfig) -> Result<Option<Self>, StorageError> {
        config.validate()?;
        if config.store_in_ram {
            info!("Off-heap storage disabled, keeping arrays in RAM");
            return Ok(None);
        }
        let storage = Self::new(config)?;
        info!(
            "Acquired off-heap storage ({} byte segments in {})",
            storage.segment_capacity,
            storage.segment_dir.display()
        );
        Ok(Some(storage))
    }

    /// Mapped storage regardless of `store_in_ram`
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        config.validate()?;
        let segment_capacity = usize::try_from(config.segment_capacity).map_err(|_| {
            StorageError::InvalidConfig(format!(
                "segment_capacity of {} bytes is not addressable on this platform",
                config.segment_capacity
            ))
        })?;
        Ok(Self {
            inner: Mutex::new(Inner {
                segments: Vec::new(),
                arrays_stored: 0,
                bytes_used: 0,
            }),
            segment_capacity,
            segment_dir: config.segment_dir(),
        })
    }

    /// Capacity of one segment in bytes
    pub fn segment_capacity(&self) -> u64 {
        self.segment_capacity as u64
    }

    /// Copy `values` into the current segment and return a view of the copy.
    ///
    /// An empty slice gives an empty view without touching any segment.
    /// Fails with [`StorageError::CapacityExceeded`] if the values cannot fit
    /// into one segment; nothing is changed in that case and earlier views
    /// stay valid.
    pub fn store<T: StorableValue>(&self, values: &[T]) -> Result<View<'_, T>, StorageError> {
        let bytes: &[u8] = bytemuck::cast_slice(values);
        if bytes.is_empty() {
            return Ok(View::empty());
        }
        if bytes.len() > self.segment_capacity {
            warn!(
                "Rejected array of {} bytes, segment capacity is {} bytes",
                bytes.len(),
                self.segment_capacity
            );
            return Err(StorageError::CapacityExceeded {
                requested: bytes.len() as u64,
                capacity: self.segment_capacity as u64,
            });
        }

        let align = std::mem::align_of::<T>();
        let mut inner = self.lock();
        let placement = inner
            .segments
            .last()
            .and_then(|segment| segment.reserve(bytes.len(), align));

        let (index, offset) = match placement {
            Some(offset) => (inner.segments.len() - 1, offset),
            None => {
                let segment = Segment::create(&self.segment_dir, self.segment_capacity)?;
                inner.segments.push(segment);
                debug!(
                    "Created storage segment {} ({} bytes)",
                    inner.segments.len(),
                    self.segment_capacity
                );
                (inner.segments.len() - 1, 0)
            }
        };

        // SAFETY: `offset` was reserved on the current high-water mark of this
        // segment while holding the lock.
        let ptr = unsafe { inner.segments[index].append(offset, bytes) };
        inner.arrays_stored += 1;
        inner.bytes_used += bytes.len() as u64;
        drop(inner);

        // SAFETY: the region was just initialized from `values`, is aligned for
        // `T` (page-aligned mapping plus an offset aligned to `align_of::<T>()`),
        // is never written again, and stays mapped until `self` is dropped,
        // which the returned lifetime prevents while the view is alive.
        let stored = unsafe { std::slice::from_raw_parts(ptr as *const T, values.len()) };
        Ok(View::new(stored))
    }

    /// Current usage
    pub fn stats(&self) -> StorageStats {
        let inner = self.lock();
        StorageStats {
            segments: inner.segments.len(),
            arrays_stored: inner.arrays_stored,
            bytes_used: inner.bytes_used,
            bytes_reserved: inner.segments.iter().map(|s| s.capacity() as u64).sum(),
        }
    }

    /// Bytes still free in the current segment
    pub fn remaining_in_segment(&self) -> u64 {
        let inner = self.lock();
        inner
            .segments
            .last()
            .map_or(0, |s| (s.capacity() - s.high_water_mark()) as u64)
    }

    // A panic while holding the lock cannot leave a half-written allocation
    // visible, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("segment_capacity", &self.segment_capacity)
            .field("segment_dir", &self.segment_dir)
            .field("stats", &self.stats())
            .finish()
    }
}

impl Drop for Storage {
    fn drop(&mut self) {
        let stats = self.stats();
        if stats.segments > 0 {
            debug!("Releasing off-heap storage: {}", stats);
        }
    }
}

/// Move `values` into `storage` if there is one, otherwise keep them on the heap
pub fn store_or_keep<'s, T: StorableValue>(
    storage: Option<&'s Storage>,
    values: Vec<T>,
) -> Result<StoredArray<'s, T>, StorageError> {
    match storage {
        Some(storage) => Ok(StoredArray::Mapped(storage.store(&values)?)),
        None => Ok(StoredArray::Heap(values)),
    }
}
