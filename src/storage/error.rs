/// Errors that can occur while storing arrays off-heap
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error while creating or mapping a segment file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single array does not fit into one segment
    #[error("Array of {requested} bytes exceeds the segment capacity of {capacity} bytes")]
    CapacityExceeded {
        /// Size of the rejected array in bytes
        requested: u64,
        /// Capacity of one segment in bytes
        capacity: u64,
    },

    /// Invalid storage configuration
    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),
}
