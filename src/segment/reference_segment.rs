//! The late-materialized view segment kind.

use std::sync::Arc;

use crate::error::StorageResult;
use crate::ids::{ColumnID, PosList};
use crate::table::Table;
use crate::value::AllTypeVariant;

/// Holds no data of its own: identifies a table, a column within it, and a position list,
/// and defers every read to that origin.
///
/// The reference to `referenced_table` is one-way — tables never point back at the
/// reference segments that target them, so no cycle is possible.
#[derive(Debug, Clone)]
pub struct ReferenceSegment {
    referenced_table: Arc<Table>,
    referenced_column_id: ColumnID,
    pos_list: Arc<PosList>,
}

impl ReferenceSegment {
    pub fn new(referenced_table: Arc<Table>, referenced_column_id: ColumnID, pos_list: Arc<PosList>) -> Self {
        Self {
            referenced_table,
            referenced_column_id,
            pos_list,
        }
    }

    pub fn at(&self, index: usize) -> StorageResult<AllTypeVariant> {
        let row_id = *self
            .pos_list
            .get(index)
            .ok_or_else(|| crate::error::StorageError::out_of_range(index, self.pos_list.len()))?;
        let chunk = self.referenced_table.get_chunk(row_id.chunk_id)?;
        let segment = chunk.segment(self.referenced_column_id)?;
        segment.at(row_id.chunk_offset.0 as usize)
    }

    pub fn size(&self) -> usize {
        self.pos_list.len()
    }

    pub fn pos_list(&self) -> &Arc<PosList> {
        &self.pos_list
    }

    pub fn referenced_table(&self) -> &Arc<Table> {
        &self.referenced_table
    }

    pub fn referenced_column_id(&self) -> ColumnID {
        self.referenced_column_id
    }
}
