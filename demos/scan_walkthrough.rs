//! A narrated walk through building a table, compressing it, and scanning it.
//!
//! Run with `cargo run --example scan_walkthrough`.

use std::sync::Arc;

use columnforge::operator::{ComparisonOperator, GetTable, Operator, TableScan};
use columnforge::{AllTypeVariant, ChunkID, ColumnID, DataType, Table, TableRegistry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut step = 0;

    let table = Arc::new(Table::new(Some(3)));
    table.add_column("name", DataType::String)?;
    table.add_column("age", DataType::Int)?;

    for (name, age) in [
        ("Bill", 65),
        ("Steve", 68),
        ("Alexander", 38),
        ("Steve", 52),
        ("Hasso", 83),
        ("Bill", 41),
    ] {
        table.append(vec![AllTypeVariant::String(name.into()), AllTypeVariant::Int(age)])?;
    }

    step += 1;
    eprintln!(
        "\n{step}) Built a table with {} rows across {} chunks.",
        table.row_count(),
        table.chunk_count()
    );

    table.compress_chunk(ChunkID(0))?;
    step += 1;
    eprintln!("\n{step}) Dictionary-compressed chunk 0; chunk 1 (the tail) stays mutable.");

    let registry = Arc::new(TableRegistry::new());
    registry.add_table("people", table)?;
    step += 1;
    eprintln!("\n{step}) Registered the table as \"people\".");

    let get_table: Arc<dyn Operator> = Arc::new(GetTable::new("people", registry));
    let named_steve = TableScan::new(
        get_table,
        ColumnID(0),
        ComparisonOperator::Equals,
        AllTypeVariant::String("Steve".into()),
    );
    let steves = named_steve.execute()?;
    step += 1;
    eprintln!(
        "\n{step}) Scanned name = \"Steve\": {} matching row(s), stored as reference segments.",
        steves.row_count()
    );

    let steves_op: Arc<dyn Operator> = Arc::new(named_steve);
    let older_steves = TableScan::new(steves_op, ColumnID(1), ComparisonOperator::GreaterThan, AllTypeVariant::Int(60));
    let result = older_steves.execute()?;
    step += 1;
    eprintln!(
        "\n{step}) Chained scan, age > 60: {} matching row(s) — references re-target the original table directly.",
        result.row_count()
    );

    Ok(())
}
