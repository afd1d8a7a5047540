//! The `Database` facade: catalog, page cache and coordinator in one handle.

use std::sync::Arc;

use crate::buffer::{Page, PageCache};
use crate::common::config::PageCacheConfig;
use crate::common::{PageId, Result, TableId, TransactionId};
use crate::concurrency::{LockMode, Transaction, TransactionCoordinator};
use crate::storage::{Catalog, PageStore, Record};

/// One shared storage core.
///
/// Cheap to share across threads behind an `Arc`; every method takes `&self`.
///
/// # Example
/// ```no_run
/// use lockstepdb::{Database, HeapFile, LockMode, Record, TableId};
/// use std::sync::Arc;
///
/// let db = Database::default();
/// db.add_table(Arc::new(HeapFile::create("orders.tbl", TableId(1), 16)?));
///
/// let mut txn = db.begin();
/// let mut record = Record::new(vec![7; 16]);
/// db.insert_record(txn.id(), TableId(1), &mut record)?;
/// db.commit(&mut txn)?;
/// # Ok::<(), lockstepdb::Error>(())
/// ```
pub struct Database {
    catalog: Arc<Catalog>,
    cache: Arc<PageCache>,
    coordinator: TransactionCoordinator,
}

impl Database {
    pub fn new(config: PageCacheConfig) -> Self {
        Self::with_catalog(config, Arc::new(Catalog::new()))
    }

    /// Build over an existing catalog.
    pub fn with_catalog(config: PageCacheConfig, catalog: Arc<Catalog>) -> Self {
        let cache = Arc::new(PageCache::new(config, Arc::clone(&catalog)));
        Self {
            coordinator: TransactionCoordinator::new(Arc::clone(&cache)),
            catalog,
            cache,
        }
    }

    /// Register a table's store.
    pub fn add_table(&self, store: Arc<dyn PageStore>) {
        self.catalog.add_table(store);
    }

    pub fn fetch(&self, tid: TransactionId, page_id: PageId, mode: LockMode) -> Result<Arc<Page>> {
        self.cache.fetch(tid, page_id, mode)
    }

    pub fn release(&self, tid: TransactionId, page_id: PageId) {
        self.cache.release(tid, page_id);
    }

    pub fn holds_lock(&self, tid: TransactionId, page_id: PageId) -> bool {
        self.cache.holds_lock(tid, page_id)
    }

    /// See [`TransactionCoordinator::complete`].
    pub fn complete(&self, tid: TransactionId, commit: bool) -> Result<()> {
        self.coordinator.complete(tid, commit)
    }

    pub fn insert_record(&self, tid: TransactionId, table_id: TableId, record: &mut Record) -> Result<()> {
        self.cache.insert_record(tid, table_id, record)
    }

    pub fn delete_record(&self, tid: TransactionId, record: &Record) -> Result<()> {
        self.cache.delete_record(tid, record)
    }

    pub fn mark_dirty(&self, tid: TransactionId, page: Arc<Page>) -> Result<()> {
        self.cache.mark_dirty(tid, page)
    }

    pub fn flush_all(&self) -> Result<()> {
        self.cache.flush_all()
    }

    pub fn discard(&self, page_id: PageId) {
        self.cache.discard(page_id);
    }

    pub fn begin(&self) -> Transaction {
        self.coordinator.begin()
    }

    pub fn commit(&self, txn: &mut Transaction) -> Result<()> {
        self.coordinator.commit(txn)
    }

    pub fn abort(&self, txn: &mut Transaction) -> Result<()> {
        self.coordinator.abort(txn)
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn cache(&self) -> &Arc<PageCache> {
        &self.cache
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new(PageCacheConfig::default())
    }
}
