//! Configuration constants for lockstepdb.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default size of a page in bytes (4KB).
///
/// Every table's page store and the page cache agree on this value. It can
/// only be changed through [`set_page_size`], which exists for test harnesses.
pub const PAGE_SIZE: usize = 4096;

/// Default number of pages the page cache holds.
pub const DEFAULT_PAGES: usize = 50;

static CURRENT_PAGE_SIZE: AtomicUsize = AtomicUsize::new(PAGE_SIZE);

/// The page size currently in effect.
#[inline]
pub fn page_size() -> usize {
    CURRENT_PAGE_SIZE.load(Ordering::Relaxed)
}

/// Override the process-wide page size.
///
/// Only meant for tests. Pages created under a different size are not
/// readable afterwards.
///
/// # Panics
/// Panics if `size` is 0.
pub fn set_page_size(size: usize) {
    assert!(size > 0, "page size must be > 0");
    CURRENT_PAGE_SIZE.store(size, Ordering::Relaxed);
}

/// Restore the default page size.
pub fn reset_page_size() {
    CURRENT_PAGE_SIZE.store(PAGE_SIZE, Ordering::Relaxed);
}

/// Settings for a [`PageCache`](crate::buffer::PageCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCacheConfig {
    /// Maximum number of resident pages.
    pub capacity: usize,
}

impl PageCacheConfig {
    /// Config with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl Default for PageCacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_PAGES,
        }
    }
}
