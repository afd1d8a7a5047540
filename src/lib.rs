//! lockstepdb - A transactional page cache with strict two-phase locking.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Database                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        Transaction Layer (concurrency/)                  │   │
//! │  │   TransactionCoordinator: force on commit,               │   │
//! │  │   before-image restore on abort, release all locks       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │             Page Cache (buffer/)                         │   │
//! │  │   ┌─────────────────────────────────────────────────┐   │   │
//! │  │   │  LockManager: S/X page locks + wait-for graph   │   │   │
//! │  │   └─────────────────────────────────────────────────┘   │   │
//! │  │   PageCache + Page + FIFO-among-clean eviction          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │     Catalog → PageStore (HeapFile) + page layouts        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, TableId, TransactionId, Error, config)
//! - [`buffer`] - The page cache and its eviction policy
//! - [`concurrency`] - Page locks, deadlock detection and transaction completion
//! - [`storage`] - Page stores, the catalog and page formats
//!
//! # Quick Start
//! ```no_run
//! use lockstepdb::{Database, HeapFile, LockMode, PageId, TableId};
//! use std::sync::Arc;
//!
//! let db = Database::default();
//! let table = Arc::new(HeapFile::create("my_table.tbl", TableId(1), 32)?);
//! let page_id = table.allocate_page()?;
//! db.add_table(table);
//!
//! let mut txn = db.begin();
//! let page = db.fetch(txn.id(), page_id, LockMode::Exclusive)?;
//! page.write().as_mut_slice()[0] = 0xAB;
//! db.mark_dirty(txn.id(), page)?;
//! db.commit(&mut txn)?;
//! # Ok::<(), lockstepdb::Error>(())
//! ```

pub mod buffer;
pub mod common;
pub mod concurrency;
pub mod database;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{PageCacheConfig, DEFAULT_PAGES, PAGE_SIZE};
pub use common::{Error, PageId, Result, TableId, TransactionId};

pub use buffer::{CacheStats, Page, PageCache, StatsSnapshot};
pub use concurrency::{LockManager, LockMode, Transaction, TransactionCoordinator, TransactionState};
pub use database::Database;
pub use storage::{Catalog, HeapFile, PageStore, Record, RecordId};
