//! Common types and utilities shared across lockstepdb.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and the page cache config
//! - Error types
//! - Identifiers (TableId, PageId, TransactionId)

pub mod config;
pub mod error;
mod page_id;
mod transaction_id;

pub use error::{Error, Result};
pub use page_id::{PageId, TableId};
pub use transaction_id::TransactionId;
