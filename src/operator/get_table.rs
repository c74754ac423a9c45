//! The leaf operator: looks a table up in a [`TableRegistry`] by name.

use std::sync::Arc;

use tracing::debug;

use crate::error::StorageResult;
use crate::operator::{ExecuteOnce, Operator};
use crate::registry::TableRegistry;
use crate::table::Table;

pub struct GetTable {
    table_name: String,
    registry: Arc<TableRegistry>,
    once: ExecuteOnce,
}

impl GetTable {
    pub fn new(table_name: impl Into<String>, registry: Arc<TableRegistry>) -> Self {
        Self {
            table_name: table_name.into(),
            registry,
            once: ExecuteOnce::default(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl Operator for GetTable {
    fn execute(&self) -> StorageResult<Arc<Table>> {
        self.once.get_or_run(|| {
            debug!(table = %self.table_name, "resolving table from registry");
            self.registry.get_table(&self.table_name)
        })
    }
}
