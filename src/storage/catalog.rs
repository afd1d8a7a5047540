//! Catalog - routes a table id to its page store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::{Error, Result, TableId};
use crate::storage::PageStore;

/// Registry of the page stores known to the process.
#[derive(Default)]
pub struct Catalog {
    tables: RwLock<HashMap<TableId, Arc<dyn PageStore>>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store under its own table id, replacing any previous one.
    pub fn add_table(&self, store: Arc<dyn PageStore>) {
        self.tables.write().insert(store.table_id(), store);
    }

    /// Look up the store for `table_id`.
    ///
    /// # Errors
    /// `Error::TableNotFound` if nothing is registered.
    pub fn store(&self, table_id: TableId) -> Result<Arc<dyn PageStore>> {
        self.tables
            .read()
            .get(&table_id)
            .cloned()
            .ok_or(Error::TableNotFound(table_id))
    }

    /// Every registered table id, sorted.
    pub fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self.tables.read().keys().copied().collect();
        ids.sort();
        ids
    }
}
