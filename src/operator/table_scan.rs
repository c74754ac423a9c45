//! A single-column, single-predicate scan: the kernel's only filtering operator.
//!
//! Output columns are always reference segments, never value or dictionary segments: every
//! column of the output schema mirrors the input schema's column names and types, but its
//! storage is a [`crate::segment::ReferenceSegment`] pointing back at wherever the matching
//! values actually live. Scanning a table that is itself a prior scan's output re-targets
//! the new reference segments at that scan's origin table directly, so reference chains
//! never nest.

use std::sync::Arc;

use tracing::debug;

use crate::error::StorageResult;
use crate::ids::{ChunkID, ChunkOffset, ColumnID, PosList, RowID, ValueID, INVALID_VALUE_ID};
use crate::operator::{ExecuteOnce, Operator};
use crate::segment::{Column, ColumnSegment, DictionarySegment, ValueSegment};
use crate::table::Table;
use crate::value::{AllTypeVariant, ColumnValue, DataType};

/// The six comparison kinds a scan predicate supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
}

impl ComparisonOperator {
    fn evaluate<T: PartialOrd>(self, lhs: &T, rhs: &T) -> bool {
        match lhs.partial_cmp(rhs) {
            None => false,
            Some(std::cmp::Ordering::Less) => matches!(
                self,
                Self::LessThan | Self::LessThanEquals | Self::NotEquals
            ),
            Some(std::cmp::Ordering::Equal) => matches!(
                self,
                Self::Equals | Self::LessThanEquals | Self::GreaterThanEquals
            ),
            Some(std::cmp::Ordering::Greater) => matches!(
                self,
                Self::GreaterThan | Self::GreaterThanEquals | Self::NotEquals
            ),
        }
    }
}

fn compare<T: PartialOrd>(lhs: &T, op: ComparisonOperator, rhs: &T) -> bool {
    op.evaluate(lhs, rhs)
}

pub struct TableScan {
    input: Arc<dyn Operator>,
    column_id: ColumnID,
    op: ComparisonOperator,
    search_value: AllTypeVariant,
    once: ExecuteOnce,
}

impl TableScan {
    pub fn new(
        input: Arc<dyn Operator>,
        column_id: ColumnID,
        op: ComparisonOperator,
        search_value: AllTypeVariant,
    ) -> Self {
        Self {
            input,
            column_id,
            op,
            search_value,
            once: ExecuteOnce::default(),
        }
    }
}

impl Operator for TableScan {
    fn execute(&self) -> StorageResult<Arc<Table>> {
        self.once.get_or_run(|| {
            let input_table = self.input.execute()?;
            match input_table.column_type(self.column_id)? {
                DataType::Int => self.run_typed::<i32>(&input_table),
                DataType::Float => self.run_typed::<f32>(&input_table),
                DataType::Double => self.run_typed::<f64>(&input_table),
                DataType::String => self.run_typed::<String>(&input_table),
            }
        })
    }
}

impl TableScan {
    fn run_typed<T: ColumnValue>(&self, input_table: &Arc<Table>) -> StorageResult<Arc<Table>> {
        let search_value = T::from_variant(self.search_value.clone())?;
        let output = Arc::new(Table::new(Some(input_table.chunk_size())));
        for column_id in 0..input_table.column_count() {
            let column_id = ColumnID(column_id as u16);
            output.add_column(input_table.column_name(column_id)?, input_table.column_type(column_id)?)?;
        }

        // One PosList accumulated across every input chunk: a scan always produces exactly
        // one output chunk, never one per input chunk, and every output column's reference
        // segment shares this same PosList by reference.
        let mut row_ids: Vec<RowID> = Vec::new();
        for chunk_index in 0..input_table.chunk_count() {
            let chunk_id = ChunkID(chunk_index as u32);
            let chunk = input_table.get_chunk(chunk_id)?;

            // Scoped so the read lock on the scanned column is released before we re-lock
            // the chunk per output column below.
            let chunk_matches: Vec<RowID> = {
                let scanned_column = chunk.segment(self.column_id)?;
                let scanned_segment = T::extract(&scanned_column)?;

                match scanned_segment {
                    ColumnSegment::Value(values) => {
                        matching_offsets_in_values(values, self.op, &search_value)
                            .into_iter()
                            .map(|offset| RowID::new(chunk_id, ChunkOffset(offset as u32)))
                            .collect()
                    }
                    ColumnSegment::Dictionary(dictionary) => {
                        matching_offsets_in_dictionary(dictionary, self.op, &search_value)
                            .into_iter()
                            .map(|offset| RowID::new(chunk_id, ChunkOffset(offset as u32)))
                            .collect()
                    }
                    ColumnSegment::Reference(reference) => {
                        let referenced_table = reference.referenced_table();
                        let mut chunk_matches = Vec::new();
                        for &row_id in reference.pos_list().iter() {
                            let origin_chunk = referenced_table.get_chunk(row_id.chunk_id)?;
                            let origin_column = origin_chunk.segment(reference.referenced_column_id())?;
                            let origin_segment = T::extract(&origin_column)?;
                            let offset = row_id.chunk_offset.0 as usize;
                            let is_match = match origin_segment {
                                ColumnSegment::Value(values) => {
                                    compare(values.get(offset)?, self.op, &search_value)
                                }
                                ColumnSegment::Dictionary(dictionary) => {
                                    compare(dictionary.get(offset)?, self.op, &search_value)
                                }
                                ColumnSegment::Reference(_) => {
                                    return Err(crate::error::StorageError::precondition(
                                        "reference segments must not chain to another reference segment",
                                    ))
                                }
                            };
                            if is_match {
                                chunk_matches.push(row_id);
                            }
                        }
                        chunk_matches
                    }
                }
            };

            debug!(chunk = chunk_index, matches = chunk_matches.len(), "scanned chunk");
            row_ids.extend(chunk_matches);
        }

        // Built unconditionally, even when nothing matched: the output always has exactly
        // one chunk, and its columns are always reference segments, never value or
        // dictionary segments, regardless of whether the PosList is empty.
        let pos_list = Arc::new(PosList::from_vec(row_ids));
        let mut output_chunk = crate::chunk::Chunk::new();
        let origin_chunk = input_table.get_chunk(ChunkID(0))?;
        for column_id in 0..input_table.column_count() {
            let column_id = ColumnID(column_id as u16);
            let data_type = input_table.column_type(column_id)?;
            let (referenced_table, referenced_column_id) =
                resolve_column_origin(&origin_chunk, column_id, input_table)?;
            output_chunk.add_segment(Column::reference(
                data_type,
                referenced_table,
                referenced_column_id,
                pos_list.clone(),
            ))?;
        }
        output.emplace_chunk(output_chunk);

        Ok(output)
    }
}

/// Where column `column_id` of `chunk` ultimately gets its values from: itself, if `chunk`
/// stores value/dictionary data for it, or that column's own reference target otherwise.
fn resolve_column_origin(
    chunk: &crate::chunk::Chunk,
    column_id: ColumnID,
    input_table: &Arc<Table>,
) -> StorageResult<(Arc<Table>, ColumnID)> {
    let column = chunk.segment(column_id)?;
    Ok(match &*column {
        Column::Int(ColumnSegment::Reference(r)) => (r.referenced_table().clone(), r.referenced_column_id()),
        Column::Float(ColumnSegment::Reference(r)) => (r.referenced_table().clone(), r.referenced_column_id()),
        Column::Double(ColumnSegment::Reference(r)) => (r.referenced_table().clone(), r.referenced_column_id()),
        Column::String(ColumnSegment::Reference(r)) => (r.referenced_table().clone(), r.referenced_column_id()),
        _ => (input_table.clone(), column_id),
    })
}

fn matching_offsets_in_values<T: ColumnValue>(
    segment: &ValueSegment<T>,
    op: ComparisonOperator,
    search_value: &T,
) -> Vec<usize> {
    segment
        .values()
        .iter()
        .enumerate()
        .filter(|(_, value)| compare(*value, op, search_value))
        .map(|(offset, _)| offset)
        .collect()
}

/// Computes the matching dictionary-code range once per chunk, then scans the attribute
/// vector comparing integer codes rather than re-running `partial_cmp` per row.
fn matching_offsets_in_dictionary<T: ColumnValue>(
    segment: &DictionarySegment<T>,
    op: ComparisonOperator,
    search_value: &T,
) -> Vec<usize> {
    let dict_len = segment.unique_values_count();
    let lower = bound_to_index(segment.lower_bound(search_value), dict_len);
    let upper = bound_to_index(segment.upper_bound(search_value), dict_len);

    let in_range = move |code: usize| -> bool {
        match op {
            ComparisonOperator::Equals => code >= lower && code < upper,
            ComparisonOperator::NotEquals => !(code >= lower && code < upper),
            ComparisonOperator::LessThan => code < lower,
            ComparisonOperator::LessThanEquals => code < upper,
            ComparisonOperator::GreaterThan => code >= upper,
            ComparisonOperator::GreaterThanEquals => code >= lower,
        }
    };

    let attribute_vector = segment.attribute_vector();
    (0..attribute_vector.size())
        .filter(|&offset| {
            let code = attribute_vector
                .get(offset)
                .expect("offset is within attribute_vector.size()");
            in_range(value_id_to_index(code))
        })
        .collect()
}

fn bound_to_index(id: ValueID, dict_len: usize) -> usize {
    if id == INVALID_VALUE_ID {
        dict_len
    } else {
        id.0 as usize
    }
}

fn value_id_to_index(id: ValueID) -> usize {
    id.0 as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ChunkID as TestChunkID;
    use crate::operator::GetTable;
    use crate::registry::TableRegistry;

    fn names_table() -> Arc<Table> {
        let table = Arc::new(Table::new(Some(3)));
        table.add_column("name", DataType::String).unwrap();
        for name in ["Bill", "Steve", "Alexander", "Steve", "Hasso", "Bill"] {
            table.append(vec![AllTypeVariant::String(name.into())]).unwrap();
        }
        table
    }

    fn scan(table: Arc<Table>, op: ComparisonOperator, value: &str) -> Arc<Table> {
        let registry = Arc::new(TableRegistry::new());
        registry.add_table("names", table).unwrap();
        let get_table: Arc<dyn Operator> = Arc::new(GetTable::new("names", registry));
        let scan = TableScan::new(
            get_table,
            ColumnID(0),
            op,
            AllTypeVariant::String(value.into()),
        );
        scan.execute().unwrap()
    }

    #[test]
    fn equals_scan_over_value_segments_finds_every_match() {
        let result = scan(names_table(), ComparisonOperator::Equals, "Steve");
        assert_eq!(result.row_count(), 2);
    }

    #[test]
    fn equals_scan_over_a_compressed_chunk_finds_every_match() {
        let table = names_table();
        table.compress_chunk(TestChunkID(0)).unwrap();
        let result = scan(table, ComparisonOperator::Equals, "Steve");
        assert_eq!(result.row_count(), 2);
    }

    #[test]
    fn not_equals_excludes_only_the_matching_rows() {
        let result = scan(names_table(), ComparisonOperator::NotEquals, "Bill");
        assert_eq!(result.row_count(), 4);
    }

    #[test]
    fn output_columns_are_always_reference_segments() {
        let result = scan(names_table(), ComparisonOperator::Equals, "Steve");
        for chunk_index in 0..result.chunk_count() {
            let chunk = result.get_chunk(ChunkID(chunk_index as u32)).unwrap();
            let column = chunk.segment(ColumnID(0)).unwrap();
            assert!(matches!(&*column, Column::String(ColumnSegment::Reference(_))));
        }
    }

    #[test]
    fn chained_scan_retargets_references_to_the_base_table() {
        let base = names_table();
        let first = scan(base.clone(), ComparisonOperator::NotEquals, "Hasso");

        let registry = Arc::new(TableRegistry::new());
        registry.add_table("filtered", first).unwrap();
        let get_table: Arc<dyn Operator> = Arc::new(GetTable::new("filtered", registry));
        let second = TableScan::new(
            get_table,
            ColumnID(0),
            ComparisonOperator::Equals,
            AllTypeVariant::String("Steve".into()),
        )
        .execute()
        .unwrap();

        assert_eq!(second.row_count(), 2);
        let chunk = second.get_chunk(ChunkID(0)).unwrap();
        let column = chunk.segment(ColumnID(0)).unwrap();
        match &*column {
            Column::String(ColumnSegment::Reference(r)) => {
                assert!(Arc::ptr_eq(r.referenced_table(), &base));
            }
            other => panic!("expected a reference segment, got {other:?}"),
        }
    }

    #[test]
    fn scan_over_multiple_input_chunks_still_produces_a_single_output_chunk() {
        // names_table() uses chunk_size 3 over 6 rows, so "Steve" matches land in both chunks.
        let result = scan(names_table(), ComparisonOperator::Equals, "Steve");
        assert_eq!(result.row_count(), 2);
        assert_eq!(result.chunk_count(), 1);
    }

    #[test]
    fn scan_for_an_absent_value_yields_a_single_empty_reference_chunk() {
        let result = scan(names_table(), ComparisonOperator::Equals, "Nobody");
        assert_eq!(result.row_count(), 0);
        assert_eq!(result.chunk_count(), 1);
        let chunk = result.get_chunk(ChunkID(0)).unwrap();
        let column = chunk.segment(ColumnID(0)).unwrap();
        assert!(matches!(&*column, Column::String(ColumnSegment::Reference(_))));
    }

    #[test]
    fn less_than_scan_over_ints_matches_the_open_range() {
        let table = Arc::new(Table::new(Some(6)));
        table.add_column("n", DataType::Int).unwrap();
        for v in [0, 2, 4, 6, 8, 10] {
            table.append(vec![AllTypeVariant::Int(v)]).unwrap();
        }
        // Rolls the full chunk over so chunk 0 becomes compressible.
        table.append(vec![AllTypeVariant::Int(12)]).unwrap();
        table.compress_chunk(TestChunkID(0)).unwrap();

        let registry = Arc::new(TableRegistry::new());
        registry.add_table("ints", table).unwrap();
        let get_table: Arc<dyn Operator> = Arc::new(GetTable::new("ints", registry));
        let result = TableScan::new(get_table, ColumnID(0), ComparisonOperator::LessThan, AllTypeVariant::Int(5))
            .execute()
            .unwrap();
        assert_eq!(result.row_count(), 3); // 0, 2, 4
    }
}
