//! Operators: the composable, execute-once units a scan pipeline is built from.

pub mod get_table;
pub mod table_scan;

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::StorageResult;
use crate::table::Table;

pub use get_table::GetTable;
pub use table_scan::{ComparisonOperator, TableScan};

/// A pipeline node that produces a table. Every operator executes exactly once and caches
/// its result, so sharing an `Arc<dyn Operator>` between consumers never recomputes the
/// output table twice.
pub trait Operator: Send + Sync {
    fn execute(&self) -> StorageResult<Arc<Table>>;
}

/// Shared execute-once caching, composed into [`GetTable`] and [`TableScan`] instead of
/// inherited from a common base type.
#[derive(Debug, Default)]
pub(crate) struct ExecuteOnce {
    result: OnceCell<Arc<Table>>,
}

impl ExecuteOnce {
    pub(crate) fn get_or_run(
        &self,
        run: impl FnOnce() -> StorageResult<Arc<Table>>,
    ) -> StorageResult<Arc<Table>> {
        if let Some(table) = self.result.get() {
            return Ok(table.clone());
        }
        let table = run()?;
        Ok(self.result.get_or_init(|| table).clone())
    }
}
