//! Page cache management.
//!
//! The page cache is the in-memory layer between transactions and page
//! stores. It holds at most `capacity` pages and never evicts a page with
//! uncommitted changes.
//!
//! # Components
//! - [`PageCache`] - The cache itself, locking every page it hands out
//! - [`Page`] - A resident page image with its before-image and dirty owner
//! - [`CacheStats`] - Hit, miss, eviction and I/O counters
//! - [`replacer`] - Eviction policy implementations

mod page;
mod page_cache;
pub mod replacer;
mod stats;

pub use page::Page;
pub use page_cache::PageCache;
pub use stats::{CacheStats, StatsSnapshot};
