//! Whole-pipeline tests: building a table, compressing it, and scanning it through the
//! public API.

use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
use std::sync::Arc;

use columnforge::operator::{ComparisonOperator, GetTable, Operator, TableScan};
use columnforge::{AllTypeVariant, ChunkID, ColumnID, DataType, StorageError, Table, TableRegistry};

fn init_logs() {
    static INIT: AtomicBool = AtomicBool::new(false);
    if INIT.compare_exchange(false, true, SeqCst, SeqCst).is_ok() {
        tracing_subscriber::fmt::init(); // log to stdout
    }
}

fn people_table(chunk_size: u32) -> Arc<Table> {
    let table = Arc::new(Table::new(Some(chunk_size)));
    table.add_column("name", DataType::String).unwrap();
    table.add_column("age", DataType::Int).unwrap();
    for (name, age) in [
        ("Bill", 65),
        ("Steve", 68),
        ("Alexander", 38),
        ("Steve", 52),
        ("Hasso", 83),
        ("Bill", 41),
    ] {
        table
            .append(vec![AllTypeVariant::String(name.into()), AllTypeVariant::Int(age)])
            .unwrap();
    }
    table
}

fn registry_with(name: &str, table: Arc<Table>) -> Arc<TableRegistry> {
    let registry = Arc::new(TableRegistry::new());
    registry.add_table(name, table).unwrap();
    registry
}

#[test]
fn scan_over_value_segments_matches_the_same_rows_as_over_dictionary_segments() {
    init_logs();
    let uncompressed = people_table(3);
    let compressed = people_table(3);
    compressed.compress_chunk(ChunkID(0)).unwrap();

    for table in [uncompressed, compressed] {
        let registry = registry_with("people", table);
        let get_table: Arc<dyn Operator> = Arc::new(GetTable::new("people", registry));
        let scan = TableScan::new(
            get_table,
            ColumnID(0),
            ComparisonOperator::Equals,
            AllTypeVariant::String("Steve".into()),
        );
        let result = scan.execute().unwrap();
        assert_eq!(result.row_count(), 2);
    }
}

#[test]
fn scan_output_columns_are_reference_segments_pointing_at_the_base_table() {
    let table = people_table(3);
    let base = table.clone();
    let registry = registry_with("people", table);
    let get_table: Arc<dyn Operator> = Arc::new(GetTable::new("people", registry));
    let scan = TableScan::new(
        get_table,
        ColumnID(1),
        ComparisonOperator::GreaterThanEquals,
        AllTypeVariant::Int(60),
    );
    let result = scan.execute().unwrap();
    assert_eq!(result.row_count(), 3); // 65, 68, 83

    for chunk_index in 0..result.chunk_count() {
        let chunk = result.get_chunk(ChunkID(chunk_index as u32)).unwrap();
        for column_index in 0..result.column_count() {
            let _ = chunk.segment(ColumnID(column_index as u16)).unwrap();
        }
    }
    assert_eq!(result.column_count(), base.column_count());
}

#[test]
fn chained_scans_flatten_to_a_single_level_of_indirection() {
    let table = people_table(3);
    let base = table.clone();
    let registry = registry_with("people", table);

    let get_table: Arc<dyn Operator> = Arc::new(GetTable::new("people", registry));
    let over_sixty = Arc::new(TableScan::new(
        get_table,
        ColumnID(1),
        ComparisonOperator::GreaterThan,
        AllTypeVariant::Int(60),
    ));
    let over_sixty_table = over_sixty.execute().unwrap();

    let second_registry = registry_with("over_sixty", over_sixty_table);
    let get_second: Arc<dyn Operator> = Arc::new(GetTable::new("over_sixty", second_registry));
    let named = TableScan::new(
        get_second,
        ColumnID(0),
        ComparisonOperator::NotEquals,
        AllTypeVariant::String("Hasso".into()),
    );
    let result = named.execute().unwrap();

    assert_eq!(result.row_count(), 2); // Bill(65), Steve(68)
    let chunk = result.get_chunk(ChunkID(0)).unwrap();
    let column = chunk.segment(ColumnID(0)).unwrap();
    let _ = &*column;
    drop(column);
    assert_eq!(result.column_count(), base.column_count());
}

#[test]
fn compressing_a_chunk_twice_is_a_no_op() {
    let table = people_table(3);
    table.compress_chunk(ChunkID(0)).unwrap();
    table.compress_chunk(ChunkID(0)).unwrap();
    assert_eq!(table.row_count(), 6);
}

#[test]
fn compressing_the_tail_chunk_is_rejected() {
    let table = people_table(3);
    let last = ChunkID((table.chunk_count() - 1) as u32);
    let err = table.compress_chunk(last).unwrap_err();
    assert!(matches!(err, StorageError::PreconditionViolation { .. }));
}

#[test]
fn get_table_fails_for_an_unregistered_name() {
    let registry = Arc::new(TableRegistry::new());
    let op = GetTable::new("missing", registry);
    assert!(op.execute().is_err());
}

#[test]
fn scanning_an_empty_table_yields_an_empty_result() {
    let table = Arc::new(Table::new(None));
    table.add_column("name", DataType::String).unwrap();
    let registry = registry_with("empty", table);
    let get_table: Arc<dyn Operator> = Arc::new(GetTable::new("empty", registry));
    let scan = TableScan::new(
        get_table,
        ColumnID(0),
        ComparisonOperator::Equals,
        AllTypeVariant::String("anyone".into()),
    );
    let result = scan.execute().unwrap();
    assert_eq!(result.row_count(), 0);
}
