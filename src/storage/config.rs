use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Configuration for off-heap storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Size of one segment in bytes; also the largest array that can be stored
    pub segment_capacity: u64,

    /// Keep arrays on the heap instead of mapping them
    /// ([`Storage::acquire`](super::Storage::acquire) then yields no storage)
    pub store_in_ram: bool,

    /// Directory for segment files (None = the OS temp directory)
    pub temp_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Default segment capacity: 1 GiB
    pub const DEFAULT_SEGMENT_CAPACITY: u64 = 1 << 30;

    /// Keep everything on the heap
    pub fn in_ram() -> Self {
        Self {
            store_in_ram: true,
            ..Self::default()
        }
    }

    /// Mapped storage with a custom segment capacity
    pub fn with_segment_capacity(segment_capacity: u64) -> Self {
        Self {
            segment_capacity,
            ..Self::default()
        }
    }

    /// Check the capacity and the segment directory
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.segment_capacity == 0 {
            return Err(StorageError::InvalidConfig(
                "segment_capacity must be greater than 0".to_string(),
            ));
        }
        if usize::try_from(self.segment_capacity).is_err() {
            return Err(StorageError::InvalidConfig(format!(
                "segment_capacity of {} bytes is not addressable on this platform",
                self.segment_capacity
            )));
        }
        if let Some(dir) = &self.temp_dir {
            if !dir.is_dir() {
                return Err(StorageError::InvalidConfig(format!(
                    "temp_dir {} is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Directory new segment files are created in
    pub fn segment_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            segment_capacity: Self::DEFAULT_SEGMENT_CAPACITY,
            store_in_ram: false,
            temp_dir: None,
        }
    }
}
