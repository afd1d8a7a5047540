//! Error types for lockstepdb.

use thiserror::Error;

use crate::common::{PageId, TableId, TransactionId};
use crate::storage::RecordId;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the storage core.
///
/// Three kinds matter to callers:
/// - [`Error::Deadlock`]: the transaction must be rolled back with
///   `complete(tid, false)`.
/// - [`Error::CacheExhausted`]: every resident page is dirty; retry after
///   some transaction finishes.
/// - [`Error::Io`] / [`Error::PageNotFound`]: page store failures, never
///   retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from a page store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page does not exist in its table.
    #[error("{0} not found")]
    PageNotFound(PageId),

    /// Granting the lock would close a cycle in the wait-for graph.
    #[error("transaction {0} aborted: deadlock detected")]
    Deadlock(TransactionId),

    /// Eviction needed a clean victim but every resident page is dirty.
    #[error("page cache exhausted: all {capacity} resident pages are dirty")]
    CacheExhausted { capacity: usize },

    /// No page store is registered for the table.
    #[error("table {0} not found in catalog")]
    TableNotFound(TableId),

    /// The record does not exist (or has no record id).
    #[error("record {0} not found")]
    RecordNotFound(RecordId),

    /// The record was never placed by a store, so it cannot be located.
    #[error("record has no record id")]
    UnplacedRecord,

    /// The record payload does not match the table's fixed record size.
    #[error("record size mismatch: expected {expected} bytes, got {actual}")]
    RecordSize { expected: usize, actual: usize },

    /// A table's record size leaves no room for a single record on a page.
    #[error("record size {record_size} does not fit a {page_size}-byte page")]
    UnsupportedRecordSize { record_size: usize, page_size: usize },
}

impl Error {
    /// True for a deadlock abort.
    pub fn is_deadlock(&self) -> bool {
        matches!(self, Error::Deadlock(_))
    }
}
