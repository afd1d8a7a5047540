//! PageData - the fixed-size byte image of a page.
//!
//! A [`PageData`] is the raw unit of I/O between a page store and the page
//! cache. Its length is the process-wide page size in effect when it was
//! created.

use std::fmt;

use crate::common::config::page_size;

/// A page-sized byte buffer.
///
/// # Copies
/// Copying a page image is explicit: use [`PageData::clone`] to take a
/// snapshot or [`PageData::copy_from`] to overwrite in place. The page cache
/// relies on snapshots never aliasing the live buffer.
///
/// # Example
/// ```
/// use lockstepdb::storage::page::PageData;
///
/// let mut page = PageData::new();
/// page.as_mut_slice()[0] = 0xFF;
/// assert_eq!(page.as_slice()[0], 0xFF);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PageData {
    data: Box<[u8]>,
}

impl PageData {
    /// Create a new zeroed page of the current page size.
    pub fn new() -> Self {
        Self {
            data: vec![0u8; page_size()].into_boxed_slice(),
        }
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Overwrite this image with another of the same length.
    ///
    /// # Panics
    /// Panics if the lengths differ.
    pub fn copy_from(&mut self, other: &PageData) {
        self.data.copy_from_slice(&other.data);
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-length image.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for PageData {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageData").field("len", &self.data.len()).finish()
    }
}
