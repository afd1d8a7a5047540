//! Page - a resident entry in the page cache.
//!
//! A [`Page`] holds a live [`PageData`] image plus the metadata the cache
//! and transaction coordinator need:
//! - Which page it is
//! - Which transaction (if any) has unflushed changes on it
//! - The before-image used to undo those changes

use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{PageId, TransactionId};
use crate::storage::page::PageData;

/// A cached page.
///
/// # Thread Safety
/// All fields use interior mutability for safe concurrent access:
/// - `data`: `RwLock` for the live image
/// - `before_image`: `Mutex` around an immutable snapshot, swapped whole
/// - `dirty_owner`: `Mutex` for the owning transaction
///
/// Page locks taken through the lock manager decide *who* may read or write;
/// the `RwLock` only keeps individual reads and writes of the bytes intact.
pub struct Page {
    id: PageId,
    data: RwLock<PageData>,
    before_image: Mutex<Arc<PageData>>,
    dirty_owner: Mutex<Option<TransactionId>>,
}

impl Page {
    /// Wrap a clean image. The before-image starts as a copy of it.
    pub fn new(id: PageId, data: PageData) -> Self {
        let before_image = Arc::new(data.clone());
        Self {
            id,
            data: RwLock::new(data),
            before_image: Mutex::new(before_image),
            dirty_owner: Mutex::new(None),
        }
    }

    /// The page's identifier.
    #[inline]
    pub fn id(&self) -> PageId {
        self.id
    }

    // ========================================================================
    // Image access (RwLock)
    // ========================================================================

    /// Acquire read access to the live image.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, PageData> {
        self.data.read()
    }

    /// Acquire write access to the live image.
    ///
    /// Writers must hold an exclusive page lock and report the change with
    /// [`PageCache::mark_dirty`](crate::buffer::PageCache::mark_dirty).
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, PageData> {
        self.data.write()
    }

    // ========================================================================
    // Dirty owner
    // ========================================================================

    /// The transaction with unflushed changes on this page, if any.
    #[inline]
    pub fn dirty_owner(&self) -> Option<TransactionId> {
        *self.dirty_owner.lock()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty_owner().is_some()
    }

    pub(crate) fn mark_dirty(&self, tid: TransactionId) {
        *self.dirty_owner.lock() = Some(tid);
    }

    pub(crate) fn clear_dirty(&self) {
        *self.dirty_owner.lock() = None;
    }

    // ========================================================================
    // Before-image
    // ========================================================================

    /// The last clean (persisted) image of this page.
    pub fn before_image(&self) -> Arc<PageData> {
        self.before_image.lock().clone()
    }

    /// Snapshot the live image as the new before-image.
    pub(crate) fn refresh_before_image(&self) {
        let snapshot = Arc::new(self.data.read().clone());
        *self.before_image.lock() = snapshot;
    }

    /// Overwrite the live image with the before-image and mark the page clean.
    pub(crate) fn restore_before_image(&self) {
        let before = self.before_image();
        self.data.write().copy_from(&before);
        self.clear_dirty();
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.id)
            .field("dirty_owner", &self.dirty_owner())
            .finish()
    }
}
