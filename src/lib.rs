//! A column-oriented, in-memory storage and scan kernel.
//!
//! * See [`Table`] for the core data structure: a schema plus a chunked, dictionary-
//!   compressible column store.
//! * See [`TableRegistry`] for how tables are looked up by name.
//! * See [`operator::TableScan`] for the kernel's one filtering operator, and
//!   [`operator::Operator`] for how operators compose into a pipeline.

mod chunk;
mod error;
mod ids;
pub mod operator;
mod registry;
pub mod segment;
mod table;
mod value;

pub use chunk::Chunk;
pub use error::{StorageError, StorageResult};
pub use ids::{ChunkID, ChunkOffset, ColumnID, PosList, RowID, ValueID, INVALID_VALUE_ID};
pub use registry::TableRegistry;
pub use table::Table;
pub use value::{AllTypeVariant, ColumnValue, DataType};
