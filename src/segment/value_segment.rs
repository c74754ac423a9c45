//! The mutable, flat-array segment kind.

use crate::error::StorageResult;
use crate::value::{AllTypeVariant, ColumnValue};

/// An append-only flat vector of `T`.
///
/// This is the only segment kind that's ever mutated in place: dictionary segments are
/// built once and frozen, reference segments own no data at all. Kernels that need raw
/// throughput should go through [`Self::values`] directly rather than [`Self::at`], which
/// pays for a clone into an [`AllTypeVariant`] on every call.
#[derive(Debug, Clone, Default)]
pub struct ValueSegment<T: ColumnValue> {
    values: Vec<T>,
}

impl<T: ColumnValue> ValueSegment<T> {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Appends a value, failing if its dynamic type doesn't match `T`.
    pub fn append(&mut self, value: AllTypeVariant) -> StorageResult<()> {
        self.values.push(T::from_variant(value)?);
        Ok(())
    }

    pub fn get(&self, index: usize) -> StorageResult<&T> {
        self.values
            .get(index)
            .ok_or_else(|| crate::error::StorageError::out_of_range(index, self.values.len()))
    }

    /// The fast path: kernels should prefer this over [`Self::at`].
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// The slow, type-erased accessor. Avoid in hot loops.
    pub fn at(&self, index: usize) -> StorageResult<AllTypeVariant> {
        self.get(index).map(|v| v.clone().into_variant())
    }
}
