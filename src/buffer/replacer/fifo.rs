//! FIFO (First-In-First-Out) replacement among clean pages.

use std::collections::VecDeque;

use crate::common::PageId;

/// Tracks the order pages were admitted to the cache.
///
/// Evicts the earliest-admitted page that the caller reports as evictable.
/// Re-accessing a resident page does not change its position.
#[derive(Debug, Default)]
pub struct FifoReplacer {
    /// Page IDs in admission order (front = oldest).
    queue: VecDeque<PageId>,
}

impl FifoReplacer {
    /// Create a new FIFO replacer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a page was admitted. Already-tracked pages keep their place.
    pub fn record_admission(&mut self, page_id: PageId) {
        if !self.queue.contains(&page_id) {
            self.queue.push_back(page_id);
        }
    }

    /// Pick and forget the oldest page for which `evictable` returns true.
    ///
    /// Returns None if no tracked page qualifies.
    pub fn evict(&mut self, evictable: impl Fn(PageId) -> bool) -> Option<PageId> {
        let position = self.queue.iter().position(|&pid| evictable(pid))?;
        self.queue.remove(position)
    }

    /// Stop tracking a page (it left the cache some other way).
    pub fn remove(&mut self, page_id: PageId) {
        self.queue.retain(|&pid| pid != page_id);
    }

    /// Number of tracked pages.
    pub fn size(&self) -> usize {
        self.queue.len()
    }
}
