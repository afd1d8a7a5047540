//! Table and page identifier types.

use std::fmt;

/// Identifies a table (and therefore its page store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Table({})", self.0)
    }
}

/// Identifies a page: the table it belongs to plus its number in that table.
///
/// Used as the key of both the page cache and the lock table.
///
/// # Example
/// ```
/// use lockstepdb::{PageId, TableId};
///
/// let pid = PageId::new(TableId(3), 42);
/// assert_eq!(pid.table_id(), TableId(3));
/// assert_eq!(pid.page_no(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    table_id: TableId,
    page_no: u32,
}

impl PageId {
    /// Create a new PageId.
    #[inline]
    pub fn new(table_id: TableId, page_no: u32) -> Self {
        PageId { table_id, page_no }
    }

    /// The table this page belongs to.
    #[inline]
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Page number within the table.
    #[inline]
    pub fn page_no(&self) -> u32 {
        self.page_no
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({}:{})", self.table_id.0, self.page_no)
    }
}
