//! Storage layer - page stores and page formats.
//!
//! This module handles persistent storage:
//! - [`PageStore`] - The per-table durable page interface
//! - [`HeapFile`] - File-backed store of fixed-length records
//! - [`Catalog`] - Table id to store routing
//! - [`page`] - Page images and layouts

mod catalog;
mod heap_file;
pub mod page;
mod page_store;

pub use catalog::Catalog;
pub use heap_file::HeapFile;
pub use page_store::{PageStore, Record, RecordId};
