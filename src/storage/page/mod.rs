//! Page images and layouts.
//!
//! This module contains:
//! - [`PageData`] - The raw page-sized byte image
//! - [`HeapPageLayout`] - Slot geometry for fixed-length record pages

mod heap_page;
mod page_data;

pub use heap_page::HeapPageLayout;
pub use page_data::PageData;
