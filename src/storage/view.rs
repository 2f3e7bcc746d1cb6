use std::ops::Deref;

/// Read-only slice of values stored in a [`Storage`](super::Storage).
///
/// Borrows the storage, so it cannot outlive it. Views are `Copy`, `Send`
/// and `Sync`; reading needs no locking.
#[derive(Clone, Copy, PartialEq)]
pub struct View<'s, T> {
    values: &'s [T],
}

impl<'s, T> View<'s, T> {
    pub(crate) fn new(values: &'s [T]) -> Self {
        Self { values }
    }

    /// View of no values
    pub fn empty() -> Self {
        Self { values: &[] }
    }

    /// The stored values
    pub fn as_slice(&self) -> &'s [T] {
        self.values
    }
}

impl<'s, T> Deref for View<'s, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.values
    }
}

impl<T> std::fmt::Debug for View<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("len", &self.values.len())
            .field("ptr", &self.values.as_ptr())
            .finish()
    }
}

/// An array kept either on the heap or in off-heap storage
#[derive(Debug, Clone, PartialEq)]
pub enum StoredArray<'s, T> {
    /// Plain heap allocation (no storage, or storing was skipped)
    Heap(Vec<T>),
    /// Values copied into a storage segment
    Mapped(View<'s, T>),
}

impl<T> StoredArray<'_, T> {
    /// Whether the values live in a storage segment
    pub fn is_mapped(&self) -> bool {
        matches!(self, StoredArray::Mapped(_))
    }
}

impl<T> Deref for StoredArray<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match self {
            StoredArray::Heap(values) => values,
            StoredArray::Mapped(view) => view.as_slice(),
        }
    }
}
