//! The page store interface and the record types it moves.

use std::fmt;
use std::sync::Arc;

use crate::buffer::{Page, PageCache};
use crate::common::{PageId, Result, TableId, TransactionId};
use crate::storage::page::PageData;

/// Where a record lives: a page plus a slot on that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot: usize,
}

impl RecordId {
    pub fn new(page_id: PageId, slot: usize) -> Self {
        Self { page_id, slot }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.page_id, self.slot)
    }
}

/// An opaque record payload.
///
/// `id` is `None` until a store places the record on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: Option<RecordId>,
    pub data: Vec<u8>,
}

impl Record {
    /// A record that has not been stored yet.
    pub fn new(data: Vec<u8>) -> Self {
        Self { id: None, data }
    }
}

/// Durable fixed-size page storage for one table.
///
/// Record-level operations receive the page cache so they can fetch pages
/// under the caller's transaction (acquiring the matching locks). They return
/// every page they modified; the cache then marks those pages dirty.
pub trait PageStore: Send + Sync {
    /// The table this store backs.
    fn table_id(&self) -> TableId;

    /// Read a page image.
    ///
    /// # Errors
    /// `Error::PageNotFound` if the page does not exist.
    fn read_page(&self, page_id: PageId) -> Result<PageData>;

    /// Persist a page image.
    fn write_page(&self, page_id: PageId, data: &PageData) -> Result<()>;

    /// Number of pages currently in the table.
    fn page_count(&self) -> Result<u32>;

    /// Insert `record`, assigning its `id`. Returns the pages modified.
    fn insert_record(
        &self,
        tid: TransactionId,
        record: &mut Record,
        cache: &PageCache,
    ) -> Result<Vec<Arc<Page>>>;

    /// Delete `record` (located by its `id`). Returns the pages modified.
    fn delete_record(
        &self,
        tid: TransactionId,
        record: &Record,
        cache: &PageCache,
    ) -> Result<Vec<Arc<Page>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_display() {
        let rid = RecordId::new(PageId::new(TableId(2), 3), 17);
        assert_eq!(format!("{}", rid), "Page(2:3)#17");
    }

    #[test]
    fn test_new_record_is_unplaced() {
        let record = Record::new(vec![1, 2, 3]);
        assert!(record.id.is_none());
        assert_eq!(record.data.len(), 3);
    }
}
