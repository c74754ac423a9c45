//! A horizontal partition of a table: one segment per column, all of equal length.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

use crate::error::{StorageError, StorageResult};
use crate::ids::ColumnID;
use crate::segment::Column;
use crate::value::AllTypeVariant;

/// Chunks are shared via `Arc` between a table and every reference segment produced by a
/// scan over it, so mutation goes through interior mutability rather than `&mut self`: the
/// tail chunk of a table stays append-able even while other holders keep their own `Arc`
/// clone of the same chunk.
#[derive(Debug)]
pub struct Chunk {
    columns: RwLock<Vec<Column>>,
    frozen: AtomicBool,
}

impl Chunk {
    pub fn new() -> Self {
        Self {
            columns: RwLock::new(Vec::new()),
            frozen: AtomicBool::new(false),
        }
    }

    /// Appends a segment as a new column. Fails once the chunk is frozen.
    pub fn add_segment(&self, column: Column) -> StorageResult<()> {
        if !self.is_writeable() {
            return Err(StorageError::immutable("chunk"));
        }
        self.columns.write().push(column);
        Ok(())
    }

    /// Appends one row: exactly one value per column, in column order.
    pub fn append(&self, row: Vec<AllTypeVariant>) -> StorageResult<()> {
        if !self.is_writeable() {
            return Err(StorageError::immutable("chunk"));
        }
        let mut columns = self.columns.write();
        if row.len() != columns.len() {
            return Err(StorageError::precondition(format!(
                "row has {} values but chunk has {} columns",
                row.len(),
                columns.len()
            )));
        }
        for (column, value) in columns.iter_mut().zip(row) {
            column.append(value)?;
        }
        Ok(())
    }

    pub fn segment(&self, column_id: ColumnID) -> StorageResult<MappedRwLockReadGuard<'_, Column>> {
        let index = column_id.0 as usize;
        let columns = self.columns.read();
        if index >= columns.len() {
            return Err(StorageError::out_of_range(index, columns.len()));
        }
        Ok(RwLockReadGuard::map(columns, |columns| &columns[index]))
    }

    pub fn column_count(&self) -> usize {
        self.columns.read().len()
    }

    /// The defensive max over per-column sizes: by invariant every segment in a chunk has
    /// the same length, but we don't trust that blindly here.
    pub fn size(&self) -> usize {
        self.columns.read().iter().map(Column::size).max().unwrap_or(0)
    }

    pub fn is_writeable(&self) -> bool {
        !self.frozen.load(Ordering::Acquire)
    }

    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DataType;

    #[test]
    fn append_requires_matching_row_length() {
        let chunk = Chunk::new();
        chunk.add_segment(Column::empty(DataType::Int)).unwrap();
        let err = chunk
            .append(vec![AllTypeVariant::Int(1), AllTypeVariant::Int(2)])
            .unwrap_err();
        assert!(matches!(err, StorageError::PreconditionViolation { .. }));
    }

    #[test]
    fn frozen_chunk_rejects_append_and_add_segment() {
        let chunk = Chunk::new();
        chunk.add_segment(Column::empty(DataType::Int)).unwrap();
        chunk.freeze();
        assert!(chunk.append(vec![AllTypeVariant::Int(1)]).is_err());
        assert!(chunk.add_segment(Column::empty(DataType::Int)).is_err());
    }

    #[test]
    fn size_is_max_of_segment_sizes() {
        let chunk = Chunk::new();
        chunk.add_segment(Column::empty(DataType::Int)).unwrap();
        chunk.append(vec![AllTypeVariant::Int(1)]).unwrap();
        assert_eq!(chunk.size(), 1);
    }
}
