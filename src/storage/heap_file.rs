//! Heap File - a file-backed page store of fixed-length records.
//!
//! The [`HeapFile`] handles all direct file operations for one table:
//! - Reading and writing pages
//! - Appending new pages when every existing page is full
//! - Placing and removing records through the page cache

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::buffer::{Page, PageCache};
use crate::common::config::page_size;
use crate::common::{Error, PageId, Result, TableId, TransactionId};
use crate::concurrency::LockMode;
use crate::storage::page::{HeapPageLayout, PageData};
use crate::storage::{PageStore, Record, RecordId};

/// Stores one table's records in a single file.
///
/// # File Layout
/// Pages are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0    page_size  ...          N×page_size
/// ```
/// Each page follows [`HeapPageLayout`] for the table's record size. The
/// layout is fixed when the file is opened, so the page size must not change
/// while a `HeapFile` is alive.
///
/// # Thread Safety
/// The file handle sits behind a `Mutex`; seeks and reads/writes happen under
/// it. Appending a page is also done under it, so concurrent inserts never
/// claim the same page number.
///
/// # Durability
/// Every write is followed by `fsync()`.
pub struct HeapFile {
    table_id: TableId,
    layout: HeapPageLayout,
    file: Mutex<File>,
}

impl HeapFile {
    /// Create a new, empty heap file.
    ///
    /// # Errors
    /// - `Error::UnsupportedRecordSize` if no record of `record_size` bytes
    ///   fits on a page (checked before the file is touched)
    /// - I/O errors if the file already exists or cannot be created
    pub fn create<P: AsRef<Path>>(path: P, table_id: TableId, record_size: usize) -> Result<Self> {
        let layout = Self::layout_for(record_size)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self::with_file(file, table_id, layout))
    }

    /// Open an existing heap file.
    ///
    /// # Errors
    /// `Error::UnsupportedRecordSize` as for [`HeapFile::create`], or an I/O
    /// error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, table_id: TableId, record_size: usize) -> Result<Self> {
        let layout = Self::layout_for(record_size)?;
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self::with_file(file, table_id, layout))
    }

    /// Open an existing heap file, or create it if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(
        path: P,
        table_id: TableId,
        record_size: usize,
    ) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path, table_id, record_size)
        } else {
            Self::create(path, table_id, record_size)
        }
    }

    fn layout_for(record_size: usize) -> Result<HeapPageLayout> {
        let page_size = page_size();
        HeapPageLayout::new(record_size, page_size).ok_or(Error::UnsupportedRecordSize {
            record_size,
            page_size,
        })
    }

    fn with_file(file: File, table_id: TableId, layout: HeapPageLayout) -> Self {
        Self {
            table_id,
            layout,
            file: Mutex::new(file),
        }
    }

    /// Slot layout used by every page of this file.
    pub fn layout(&self) -> HeapPageLayout {
        self.layout
    }

    /// Total size of the file in bytes.
    pub fn file_size(&self) -> Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    /// Append a zeroed page and return its id.
    pub fn allocate_page(&self) -> Result<PageId> {
        let mut file = self.file.lock();
        let page_no = (file.metadata()?.len() / page_size() as u64) as u32;
        let page_id = PageId::new(self.table_id, page_no);

        file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        file.write_all(PageData::new().as_slice())?;
        file.sync_all()?;

        debug!(page = %page_id, "appended heap page");
        Ok(page_id)
    }

    fn offset(page_id: PageId) -> u64 {
        page_id.page_no() as u64 * page_size() as u64
    }

    fn check_record_size(&self, record: &Record) -> Result<()> {
        if record.data.len() != self.layout.record_size() {
            return Err(Error::RecordSize {
                expected: self.layout.record_size(),
                actual: record.data.len(),
            });
        }
        Ok(())
    }

    /// Place `record` on `page` if it has room.
    ///
    /// The page is marked dirty under its write guard so eviction never sees
    /// it clean with the record on it.
    fn try_place(&self, tid: TransactionId, page: &Page, record: &mut Record) -> bool {
        let mut data = page.write();
        match self.layout.free_slot(&data) {
            Some(slot) => {
                self.layout.write(&mut data, slot, &record.data);
                page.mark_dirty(tid);
                record.id = Some(RecordId::new(page.id(), slot));
                true
            }
            None => false,
        }
    }

    /// Every live record in the table, read under shared locks.
    ///
    /// Locks are held until the transaction completes.
    pub fn scan(&self, tid: TransactionId, cache: &PageCache) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for page_no in 0..self.page_count()? {
            let page_id = PageId::new(self.table_id, page_no);
            let page = cache.fetch(tid, page_id, LockMode::Shared)?;
            let data = page.read();
            for slot in self.layout.used_slots(&data) {
                if let Some(bytes) = self.layout.read(&data, slot) {
                    records.push(Record {
                        id: Some(RecordId::new(page_id, slot)),
                        data: bytes.to_vec(),
                    });
                }
            }
        }
        Ok(records)
    }
}

impl PageStore for HeapFile {
    fn table_id(&self) -> TableId {
        self.table_id
    }

    fn read_page(&self, page_id: PageId) -> Result<PageData> {
        let mut file = self.file.lock();
        let pages = file.metadata()?.len() / page_size() as u64;
        if page_id.page_no() as u64 >= pages {
            return Err(Error::PageNotFound(page_id));
        }

        file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        let mut data = PageData::new();
        file.read_exact(data.as_mut_slice())?;

        Ok(data)
    }

    fn write_page(&self, page_id: PageId, data: &PageData) -> Result<()> {
        let mut file = self.file.lock();
        let pages = file.metadata()?.len() / page_size() as u64;
        if page_id.page_no() as u64 >= pages {
            return Err(Error::PageNotFound(page_id));
        }

        file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        file.write_all(data.as_slice())?;
        file.sync_all()?;

        Ok(())
    }

    fn page_count(&self) -> Result<u32> {
        Ok((self.file_size()? / page_size() as u64) as u32)
    }

    fn insert_record(
        &self,
        tid: TransactionId,
        record: &mut Record,
        cache: &PageCache,
    ) -> Result<Vec<Arc<Page>>> {
        self.check_record_size(record)?;

        for page_no in 0..self.page_count()? {
            let page_id = PageId::new(self.table_id, page_no);
            let already_held = cache.holds_lock(tid, page_id);

            let page = cache.fetch(tid, page_id, LockMode::Shared)?;
            let has_room = self.layout.free_slot(&page.read()).is_some();
            if !has_room {
                // Nothing was read that the transaction depends on.
                if !already_held {
                    cache.release(tid, page_id);
                }
                continue;
            }

            let page = cache.fetch(tid, page_id, LockMode::Exclusive)?;
            if self.try_place(tid, &page, record) {
                return Ok(vec![page]);
            }
        }

        let page_id = self.allocate_page()?;
        let page = cache.fetch(tid, page_id, LockMode::Exclusive)?;
        if !self.try_place(tid, &page, record) {
            // Layouts always have at least one slot, so a fresh page has room.
            return Err(Error::UnsupportedRecordSize {
                record_size: self.layout.record_size(),
                page_size: page_size(),
            });
        }
        Ok(vec![page])
    }

    fn delete_record(
        &self,
        tid: TransactionId,
        record: &Record,
        cache: &PageCache,
    ) -> Result<Vec<Arc<Page>>> {
        let rid = record.id.ok_or(Error::UnplacedRecord)?;
        if rid.page_id.table_id() != self.table_id || rid.page_id.page_no() >= self.page_count()? {
            return Err(Error::RecordNotFound(rid));
        }

        let page = cache.fetch(tid, rid.page_id, LockMode::Exclusive)?;
        {
            let mut data = page.write();
            if !self.layout.clear(&mut data, rid.slot) {
                return Err(Error::RecordNotFound(rid));
            }
            page.mark_dirty(tid);
        }
        Ok(vec![page])
    }
}
