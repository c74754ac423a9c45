//! The catalog of named tables that [`crate::operator::get_table::GetTable`] resolves against.
//!
//! Kept as an explicit, caller-constructed value rather than a hidden global singleton: a
//! pipeline's operators take a `&TableRegistry` (or an `Arc<TableRegistry>`) the way they
//! take any other input, so tests can build an isolated registry per case instead of
//! sharing mutable global state.

use std::sync::Arc;

use ahash::HashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::table::Table;

#[derive(Default)]
pub struct TableRegistry {
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&self, name: impl Into<String>, table: Arc<Table>) -> StorageResult<()> {
        let name = name.into();
        let mut tables = self.tables.write();
        if tables.contains_key(&name) {
            return Err(StorageError::duplicate_name(name));
        }
        debug!(table = %name, "registered table");
        tables.insert(name, table);
        Ok(())
    }

    pub fn drop_table(&self, name: &str) -> StorageResult<()> {
        self.tables
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(name))
    }

    pub fn get_table(&self, name: &str) -> StorageResult<Arc<Table>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::not_found(name))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    pub fn reset(&self) {
        self.tables.write().clear();
    }
}
