//! Page Cache - the bounded page caching layer.
//!
//! The [`PageCache`] provides:
//! - Page caching between page stores and memory
//! - Lock acquisition on every fetch (through its [`LockManager`])
//! - Dirty tracking per transaction
//! - No-steal FIFO eviction among clean pages

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::buffer::replacer::FifoReplacer;
use crate::buffer::{CacheStats, Page};
use crate::common::config::PageCacheConfig;
use crate::common::{Error, PageId, Result, TableId, TransactionId};
use crate::concurrency::{LockManager, LockMode};
use crate::storage::{Catalog, Record};

/// Resident pages and their admission order, changed together.
struct CacheState {
    pages: HashMap<PageId, Arc<Page>>,
    replacer: FifoReplacer,
}

impl CacheState {
    fn admit(&mut self, page: Arc<Page>) {
        self.replacer.record_admission(page.id());
        self.pages.insert(page.id(), page);
    }
}

/// Caches up to `capacity` pages for concurrent transactions.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                         PageCache                           │
/// │  ┌──────────────────────┐  ┌──────────────┐                 │
/// │  │ pages                │  │   replacer   │   Mutex         │
/// │  │ PageId → Arc<Page>   │  │ FifoReplacer │   (CacheState)  │
/// │  └──────────────────────┘  └──────────────┘                 │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐       │
/// │  │ LockManager  │  │   catalog    │  │    stats     │       │
/// │  │ locks + WFG  │  │ → PageStore  │  │   atomics    │       │
/// │  └──────────────┘  └──────────────┘  └──────────────┘       │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `state`: `Mutex`: admission, eviction and discard are mutually exclusive
/// - `locks`: internally synchronized; never called with `state` held
/// - `stats`: no lock, all atomic counters
///
/// Store reads on a miss happen outside `state`; the page table is re-checked
/// afterwards so a racing loader's page wins and no PageId is ever resident
/// twice.
///
/// # Usage
/// ```ignore
/// let cache = PageCache::new(PageCacheConfig::default(), catalog);
/// let page = cache.fetch(tid, pid, LockMode::Exclusive)?;
/// page.write().as_mut_slice()[0] = 0xAB;
/// cache.mark_dirty(tid, page)?;
/// ```
pub struct PageCache {
    state: Mutex<CacheState>,
    locks: LockManager,
    catalog: Arc<Catalog>,
    stats: CacheStats,
    capacity: usize,
}

impl PageCache {
    /// Create an empty cache over the stores registered in `catalog`.
    ///
    /// # Panics
    /// Panics if `config.capacity` is 0.
    pub fn new(config: PageCacheConfig, catalog: Arc<Catalog>) -> Self {
        assert!(config.capacity > 0, "capacity must be > 0");

        Self {
            state: Mutex::new(CacheState {
                pages: HashMap::new(),
                replacer: FifoReplacer::new(),
            }),
            locks: LockManager::new(),
            catalog,
            stats: CacheStats::new(),
            capacity: config.capacity,
        }
    }

    // ========================================================================
    // Public API: Fetch and locks
    // ========================================================================

    /// Fetch a page under `tid`, locking it in `mode` first.
    ///
    /// If the page is resident it is returned immediately after the lock is
    /// granted; otherwise it is loaded from its store, evicting the oldest
    /// clean page if the cache is full.
    ///
    /// # Errors
    /// - `Error::Deadlock` if the lock request would deadlock
    /// - `Error::CacheExhausted` if every resident page is dirty
    /// - `Error::PageNotFound` / `Error::Io` from the store
    pub fn fetch(&self, tid: TransactionId, page_id: PageId, mode: LockMode) -> Result<Arc<Page>> {
        self.locks.acquire(tid, page_id, mode)?;

        if let Some(page) = self.resident_page(page_id) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(page);
        }

        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
        let store = self.catalog.store(page_id.table_id())?;
        let data = store.read_page(page_id)?;
        self.stats.pages_read.fetch_add(1, Ordering::Relaxed);

        let mut state = self.state.lock();
        if let Some(page) = state.pages.get(&page_id) {
            return Ok(Arc::clone(page));
        }
        self.make_room(&mut state)?;

        let page = Arc::new(Page::new(page_id, data));
        state.admit(Arc::clone(&page));
        debug!(txn = %tid, page = %page_id, ?mode, "loaded page");

        Ok(page)
    }

    /// Release `tid`'s lock on a page before the transaction ends.
    ///
    /// Only safe when `tid` neither modified the page nor depends on what it
    /// read there.
    pub fn release(&self, tid: TransactionId, page_id: PageId) {
        self.locks.release(tid, page_id);
    }

    /// True if `tid` holds any lock on `page_id`.
    pub fn holds_lock(&self, tid: TransactionId, page_id: PageId) -> bool {
        self.locks.holds_lock(tid, page_id)
    }

    // ========================================================================
    // Public API: Record mutations
    // ========================================================================

    /// Insert `record` into `table_id` on behalf of `tid`.
    ///
    /// Every page the store modifies is marked dirty by `tid`. On failure
    /// `record.id` is reset to `None`.
    pub fn insert_record(&self, tid: TransactionId, table_id: TableId, record: &mut Record) -> Result<()> {
        let store = self.catalog.store(table_id)?;
        let placed = store
            .insert_record(tid, record, self)
            .and_then(|pages| pages.into_iter().try_for_each(|page| self.mark_dirty(tid, page)));
        if placed.is_err() {
            record.id = None;
        }
        placed
    }

    /// Delete `record` (located by its id) on behalf of `tid`.
    pub fn delete_record(&self, tid: TransactionId, record: &Record) -> Result<()> {
        let rid = record.id.ok_or(Error::UnplacedRecord)?;
        let store = self.catalog.store(rid.page_id.table_id())?;
        for page in store.delete_record(tid, record, self)? {
            self.mark_dirty(tid, page)?;
        }
        Ok(())
    }

    /// Record that `tid` modified `page`.
    ///
    /// A resident page with the same id takes over the reported image if it
    /// is a different object. A non-resident page is admitted, evicting a
    /// clean page first if the cache is full. Callers must drop any guard on
    /// the page's image before calling this.
    ///
    /// # Errors
    /// `Error::CacheExhausted` if the page must be admitted but every
    /// resident page is dirty.
    pub fn mark_dirty(&self, tid: TransactionId, page: Arc<Page>) -> Result<()> {
        let mut state = self.state.lock();

        if let Some(resident) = state.pages.get(&page.id()) {
            if !Arc::ptr_eq(resident, &page) {
                resident.write().copy_from(&page.read());
            }
            resident.mark_dirty(tid);
            return Ok(());
        }

        self.make_room(&mut state)?;
        page.mark_dirty(tid);
        debug!(txn = %tid, page = %page.id(), "admitted dirty page");
        state.admit(page);
        Ok(())
    }

    // ========================================================================
    // Public API: Flush and discard
    // ========================================================================

    /// Write a resident dirty page to its store and mark it clean.
    ///
    /// # Errors
    /// I/O errors from the store.
    pub fn flush_page(&self, page_id: PageId) -> Result<()> {
        match self.resident_page(page_id) {
            Some(page) => self.flush(&page),
            None => Ok(()),
        }
    }

    /// Flush every resident dirty page.
    ///
    /// This writes uncommitted changes, so it breaks no-steal if
    /// transactions are still running.
    pub fn flush_all(&self) -> Result<()> {
        let pages: Vec<Arc<Page>> = self.state.lock().pages.values().cloned().collect();
        for page in pages {
            self.flush(&page)?;
        }
        Ok(())
    }

    /// Flush exactly the pages `tid` holds locks on.
    pub fn flush_pages(&self, tid: TransactionId) -> Result<()> {
        for page_id in self.locks.held_pages(tid) {
            self.flush_page(page_id)?;
        }
        Ok(())
    }

    /// Drop a page from the cache without writing it.
    ///
    /// Used by rollback and by callers that guarantee the page's current
    /// image will never be read again.
    pub fn discard(&self, page_id: PageId) {
        let mut state = self.state.lock();
        if state.pages.remove(&page_id).is_some() {
            state.replacer.remove(page_id);
            debug!(page = %page_id, "discarded page");
        }
    }

    // ========================================================================
    // Transaction completion
    // ========================================================================

    /// Force `pages` to their stores and refresh their before-images.
    ///
    /// Stops at the first failed write.
    pub(crate) fn commit_pages(&self, tid: TransactionId, pages: &[PageId]) -> Result<()> {
        for &page_id in pages {
            if let Some(page) = self.resident_page(page_id) {
                self.flush(&page)?;
                page.refresh_before_image();
            }
        }
        debug!(txn = %tid, pages = pages.len(), "forced pages for commit");
        Ok(())
    }

    /// Restore every page in `pages` that `tid` dirtied to its before-image.
    pub(crate) fn rollback_pages(&self, tid: TransactionId, pages: &[PageId]) {
        let mut restored = 0;
        for &page_id in pages {
            if let Some(page) = self.resident_page(page_id) {
                if page.dirty_owner() == Some(tid) {
                    page.restore_before_image();
                    restored += 1;
                }
            }
        }
        debug!(txn = %tid, restored, "rolled back pages");
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Maximum number of resident pages.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident pages.
    pub fn len(&self) -> usize {
        self.state.lock().pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `page_id` is resident.
    pub fn is_resident(&self, page_id: PageId) -> bool {
        self.state.lock().pages.contains_key(&page_id)
    }

    /// The resident page for `page_id`, without locking or loading.
    pub fn resident_page(&self, page_id: PageId) -> Option<Arc<Page>> {
        self.state.lock().pages.get(&page_id).cloned()
    }

    /// Page cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The lock manager consulted by every fetch.
    pub fn lock_manager(&self) -> &LockManager {
        &self.locks
    }

    /// The catalog pages are routed through.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Evict clean pages until there is room for one more.
    fn make_room(&self, state: &mut CacheState) -> Result<()> {
        while state.pages.len() >= self.capacity {
            let CacheState { pages, replacer } = &mut *state;
            let victim = replacer.evict(|pid| pages.get(&pid).is_some_and(|p| !p.is_dirty()));

            match victim {
                Some(page_id) => {
                    pages.remove(&page_id);
                    self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                    debug!(page = %page_id, "evicted clean page");
                }
                None => {
                    warn!(capacity = self.capacity, "no clean page to evict");
                    return Err(Error::CacheExhausted {
                        capacity: self.capacity,
                    });
                }
            }
        }
        Ok(())
    }

    /// Write `page` if dirty and mark it clean.
    fn flush(&self, page: &Page) -> Result<()> {
        let Some(owner) = page.dirty_owner() else {
            return Ok(());
        };

        let store = self.catalog.store(page.id().table_id())?;
        {
            // Writers need the write guard, so no new change can be marked
            // between the write and the clear.
            let data = page.read();
            store.write_page(page.id(), &data)?;
            page.clear_dirty();
        }
        self.stats.pages_written.fetch_add(1, Ordering::Relaxed);
        debug!(txn = %owner, page = %page.id(), "flushed page");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::page::PageData;
    use crate::storage::{HeapFile, PageStore, RecordId};
    use std::sync::mpsc::{Receiver, Sender};
    use tempfile::tempdir;

    const TABLE: TableId = TableId(1);

    fn pid(no: u32) -> PageId {
        PageId::new(TABLE, no)
    }

    /// Helper to create a cache over one heap file holding `pages` pages.
    ///
    /// Byte 0 of page N is N.
    fn create_test_cache(capacity: usize, pages: u32) -> (PageCache, Arc<HeapFile>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let file = Arc::new(HeapFile::create(dir.path().join("t.dat"), TABLE, 8).unwrap());
        for _ in 0..pages {
            let page_id = file.allocate_page().unwrap();
            let mut data = PageData::new();
            data.as_mut_slice()[0] = page_id.page_no() as u8;
            file.write_page(page_id, &data).unwrap();
        }

        let catalog = Arc::new(Catalog::new());
        catalog.add_table(file.clone());
        (PageCache::new(PageCacheConfig::with_capacity(capacity), catalog), file, dir)
    }

    const MEM_TABLE: TableId = TableId(2);

    fn mem_pid(no: u32) -> PageId {
        PageId::new(MEM_TABLE, no)
    }

    /// In-memory store that logs byte 1 of every page it writes.
    ///
    /// When `gate` is set, the first write signals the sender and then waits
    /// on the receiver before returning.
    #[derive(Default)]
    struct MemoryStore {
        pages: Mutex<HashMap<PageId, PageData>>,
        writes: Mutex<Vec<(PageId, u8)>>,
        gate: Mutex<Option<(Sender<()>, Receiver<()>)>>,
    }

    impl PageStore for MemoryStore {
        fn table_id(&self) -> TableId {
            MEM_TABLE
        }

        fn read_page(&self, page_id: PageId) -> Result<PageData> {
            self.pages
                .lock()
                .get(&page_id)
                .cloned()
                .ok_or(Error::PageNotFound(page_id))
        }

        fn write_page(&self, page_id: PageId, data: &PageData) -> Result<()> {
            self.writes.lock().push((page_id, data.as_slice()[1]));
            self.pages.lock().insert(page_id, data.clone());

            let gate = self.gate.lock().take();
            if let Some((entered, resume)) = gate {
                entered.send(()).unwrap();
                resume.recv().unwrap();
            }
            Ok(())
        }

        fn page_count(&self) -> Result<u32> {
            Ok(self.pages.lock().len() as u32)
        }

        /// Places every record in slot 0 of page 0, on a page object the
        /// cache has never seen.
        fn insert_record(
            &self,
            _tid: TransactionId,
            record: &mut Record,
            _cache: &PageCache,
        ) -> Result<Vec<Arc<Page>>> {
            let page_id = mem_pid(0);
            let mut data = self.read_page(page_id)?;
            data.as_mut_slice()[..record.data.len()].copy_from_slice(&record.data);
            record.id = Some(RecordId::new(page_id, 0));
            Ok(vec![Arc::new(Page::new(page_id, data))])
        }

        fn delete_record(
            &self,
            _tid: TransactionId,
            _record: &Record,
            _cache: &PageCache,
        ) -> Result<Vec<Arc<Page>>> {
            Ok(Vec::new())
        }
    }

    fn create_memory_cache(capacity: usize, pages: u32) -> (PageCache, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        for no in 0..pages {
            store.pages.lock().insert(mem_pid(no), PageData::new());
        }
        let catalog = Arc::new(Catalog::new());
        catalog.add_table(store.clone());
        (PageCache::new(PageCacheConfig::with_capacity(capacity), catalog), store)
    }

    /// Fetch exclusively, set byte 1 and report the write.
    fn write_byte(cache: &PageCache, tid: TransactionId, page_id: PageId, value: u8) {
        let page = cache.fetch(tid, page_id, LockMode::Exclusive).unwrap();
        page.write().as_mut_slice()[1] = value;
        cache.mark_dirty(tid, page).unwrap();
    }

    #[test]
    fn test_fetch_loads_then_hits() {
        let (cache, _file, _dir) = create_test_cache(4, 2);
        let tid = TransactionId::fresh();

        let first = cache.fetch(tid, pid(1), LockMode::Shared).unwrap();
        assert_eq!(first.read().as_slice()[0], 1);
        let second = cache.fetch(tid, pid(1), LockMode::Shared).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.holds_lock(tid, pid(1)));
        let snapshot = cache.stats().snapshot();
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.cache_hits, 1);
    }

    #[test]
    fn test_fifo_eviction_among_clean_pages() {
        let (cache, _file, _dir) = create_test_cache(2, 3);
        let tid = TransactionId::fresh();

        cache.fetch(tid, pid(0), LockMode::Shared).unwrap();
        cache.fetch(tid, pid(1), LockMode::Shared).unwrap();
        // Re-access does not move page 0 to the back.
        cache.fetch(tid, pid(0), LockMode::Shared).unwrap();
        cache.fetch(tid, pid(2), LockMode::Shared).unwrap();

        assert!(!cache.is_resident(pid(0)));
        assert!(cache.is_resident(pid(1)));
        assert!(cache.is_resident(pid(2)));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().snapshot().evictions, 1);
    }

    #[test]
    fn test_eviction_skips_dirty_pages() {
        let (cache, _file, _dir) = create_test_cache(2, 3);
        let tid = TransactionId::fresh();

        write_byte(&cache, tid, pid(0), 0xAA);
        cache.fetch(tid, pid(1), LockMode::Shared).unwrap();
        cache.fetch(tid, pid(2), LockMode::Shared).unwrap();

        assert!(cache.is_resident(pid(0)));
        assert!(!cache.is_resident(pid(1)));
        assert_eq!(cache.resident_page(pid(0)).unwrap().dirty_owner(), Some(tid));
    }

    #[test]
    fn test_all_dirty_exhausts_cache() {
        let (cache, _file, _dir) = create_test_cache(2, 3);
        let tid = TransactionId::fresh();

        write_byte(&cache, tid, pid(0), 1);
        write_byte(&cache, tid, pid(1), 2);

        let result = cache.fetch(tid, pid(2), LockMode::Shared);
        assert!(matches!(result, Err(Error::CacheExhausted { capacity: 2 })));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_mark_dirty_admits_evicted_page() {
        let (cache, file, _dir) = create_test_cache(1, 2);
        let tid = TransactionId::fresh();

        let page = cache.fetch(tid, pid(0), LockMode::Exclusive).unwrap();
        page.write().as_mut_slice()[1] = 0x55;
        // Page 0 is still clean, so loading page 1 evicts it.
        cache.fetch(tid, pid(1), LockMode::Shared).unwrap();
        assert!(!cache.is_resident(pid(0)));

        cache.mark_dirty(tid, page).unwrap();
        assert!(cache.is_resident(pid(0)));
        assert!(!cache.is_resident(pid(1)));

        cache.flush_page(pid(0)).unwrap();
        assert_eq!(file.read_page(pid(0)).unwrap().as_slice()[1], 0x55);
    }

    #[test]
    fn test_mark_dirty_exhausted_does_not_admit() {
        let (cache, file, _dir) = create_test_cache(2, 3);
        let tid = TransactionId::fresh();

        write_byte(&cache, tid, pid(0), 1);
        write_byte(&cache, tid, pid(1), 2);

        let mut data = file.read_page(pid(2)).unwrap();
        data.as_mut_slice()[1] = 3;
        let result = cache.mark_dirty(tid, Arc::new(Page::new(pid(2), data)));

        assert!(matches!(result, Err(Error::CacheExhausted { capacity: 2 })));
        assert_eq!(cache.len(), 2);
        assert!(!cache.is_resident(pid(2)));
        assert!(cache.resident_page(pid(0)).unwrap().is_dirty());
        assert_eq!(cache.stats().snapshot().evictions, 0);
        assert_eq!(file.read_page(pid(2)).unwrap().as_slice()[1], 0);
    }

    #[test]
    fn test_insert_exhausted_leaves_record_unplaced() {
        let (cache, store) = create_memory_cache(2, 3);
        let tid = TransactionId::fresh();

        write_byte(&cache, tid, mem_pid(1), 1);
        write_byte(&cache, tid, mem_pid(2), 2);

        let mut record = Record::new(vec![7; 4]);
        let result = cache.insert_record(tid, MEM_TABLE, &mut record);

        assert!(matches!(result, Err(Error::CacheExhausted { capacity: 2 })));
        assert!(record.id.is_none());
        assert!(!cache.is_resident(mem_pid(0)));
        assert_eq!(cache.len(), 2);
        assert!(store.writes.lock().is_empty());
    }

    #[test]
    fn test_write_during_flush_keeps_page_dirty() {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let (cache, store) = create_memory_cache(4, 1);
        let page_id = mem_pid(0);
        let tid = TransactionId::fresh();

        let page = cache.fetch(tid, page_id, LockMode::Exclusive).unwrap();
        page.write().as_mut_slice()[1] = 1;
        cache.mark_dirty(tid, Arc::clone(&page)).unwrap();

        let (entered_tx, entered_rx) = mpsc::channel();
        let (resume_tx, resume_rx) = mpsc::channel();
        *store.gate.lock() = Some((entered_tx, resume_rx));

        thread::scope(|s| {
            s.spawn(|| cache.flush_page(page_id).unwrap());
            entered_rx.recv().unwrap();

            // The flush is mid-write; this writer must wait for it to finish.
            s.spawn(|| {
                page.write().as_mut_slice()[1] = 2;
                cache.mark_dirty(tid, Arc::clone(&page)).unwrap();
            });
            thread::sleep(Duration::from_millis(20));
            resume_tx.send(()).unwrap();
        });

        assert_eq!(page.dirty_owner(), Some(tid));

        cache.commit_pages(tid, &[page_id]).unwrap();
        assert_eq!(*store.writes.lock(), vec![(page_id, 1), (page_id, 2)]);
        assert_eq!(store.read_page(page_id).unwrap().as_slice()[1], 2);
    }

    #[test]
    fn test_mark_dirty_copies_into_resident_page() {
        let (cache, _file, _dir) = create_test_cache(4, 1);
        let tid = TransactionId::fresh();
        let resident = cache.fetch(tid, pid(0), LockMode::Exclusive).unwrap();

        let mut data = PageData::new();
        data.as_mut_slice()[1] = 0x77;
        cache.mark_dirty(tid, Arc::new(Page::new(pid(0), data))).unwrap();

        assert_eq!(resident.read().as_slice()[1], 0x77);
        assert_eq!(resident.dirty_owner(), Some(tid));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_flush_page_and_flush_all() {
        let (cache, file, _dir) = create_test_cache(4, 3);
        let tid = TransactionId::fresh();

        write_byte(&cache, tid, pid(0), 0x10);
        write_byte(&cache, tid, pid(1), 0x11);
        cache.fetch(tid, pid(2), LockMode::Shared).unwrap();

        cache.flush_page(pid(0)).unwrap();
        assert!(!cache.resident_page(pid(0)).unwrap().is_dirty());
        assert_eq!(file.read_page(pid(0)).unwrap().as_slice()[1], 0x10);
        assert_eq!(file.read_page(pid(1)).unwrap().as_slice()[1], 0);

        cache.flush_all().unwrap();
        assert_eq!(file.read_page(pid(1)).unwrap().as_slice()[1], 0x11);
        // Clean pages are not rewritten.
        assert_eq!(cache.stats().snapshot().pages_written, 2);
    }

    #[test]
    fn test_flush_pages_only_touches_held_pages() {
        let (cache, file, _dir) = create_test_cache(4, 2);
        let (t1, t2) = (TransactionId::fresh(), TransactionId::fresh());

        write_byte(&cache, t1, pid(0), 1);
        write_byte(&cache, t2, pid(1), 2);

        cache.flush_pages(t1).unwrap();
        assert_eq!(file.read_page(pid(0)).unwrap().as_slice()[1], 1);
        assert_eq!(file.read_page(pid(1)).unwrap().as_slice()[1], 0);
        assert!(cache.resident_page(pid(1)).unwrap().is_dirty());
    }

    #[test]
    fn test_discard_does_not_write() {
        let (cache, file, _dir) = create_test_cache(4, 1);
        let tid = TransactionId::fresh();

        write_byte(&cache, tid, pid(0), 9);
        cache.discard(pid(0));

        assert!(cache.is_empty());
        assert_eq!(file.read_page(pid(0)).unwrap().as_slice()[1], 0);
        let reloaded = cache.fetch(tid, pid(0), LockMode::Shared).unwrap();
        assert_eq!(reloaded.read().as_slice()[1], 0);
    }

    #[test]
    fn test_commit_and_rollback_pages() {
        let (cache, file, _dir) = create_test_cache(4, 2);
        let tid = TransactionId::fresh();

        write_byte(&cache, tid, pid(0), 3);
        cache.commit_pages(tid, &[pid(0)]).unwrap();
        let page = cache.resident_page(pid(0)).unwrap();
        assert!(!page.is_dirty());
        assert_eq!(page.before_image().as_slice()[1], 3);
        assert_eq!(file.read_page(pid(0)).unwrap().as_slice()[1], 3);

        write_byte(&cache, tid, pid(0), 4);
        cache.rollback_pages(tid, &[pid(0)]);
        assert_eq!(page.read().as_slice()[1], 3);
        assert!(!page.is_dirty());
    }

    #[test]
    fn test_rollback_ignores_pages_dirtied_by_others() {
        let (cache, _file, _dir) = create_test_cache(4, 1);
        let (t1, t2) = (TransactionId::fresh(), TransactionId::fresh());

        write_byte(&cache, t1, pid(0), 5);
        cache.rollback_pages(t2, &[pid(0)]);

        let page = cache.resident_page(pid(0)).unwrap();
        assert_eq!(page.read().as_slice()[1], 5);
        assert_eq!(page.dirty_owner(), Some(t1));
    }

    #[test]
    fn test_page_not_found() {
        let (cache, _file, _dir) = create_test_cache(4, 1);
        let result = cache.fetch(TransactionId::fresh(), pid(5), LockMode::Shared);
        assert!(matches!(result, Err(Error::PageNotFound(p)) if p == pid(5)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unknown_table() {
        let (cache, _file, _dir) = create_test_cache(4, 1);
        let result = cache.fetch(TransactionId::fresh(), PageId::new(TableId(99), 0), LockMode::Shared);
        assert!(matches!(result, Err(Error::TableNotFound(TableId(99)))));
    }

    #[test]
    fn test_concurrent_fetches_share_one_page() {
        use std::thread;

        let (cache, _file, _dir) = create_test_cache(4, 1);
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let tid = TransactionId::fresh();
                    let page = cache.fetch(tid, pid(0), LockMode::Shared).unwrap();
                    cache.lock_manager().release_all(tid);
                    page
                })
            })
            .collect();

        let pages: Vec<Arc<Page>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let resident = cache.resident_page(pid(0)).unwrap();
        assert!(pages.iter().all(|p| Arc::ptr_eq(p, &resident)));
        assert_eq!(cache.len(), 1);
    }
}
