//! Concurrency control: page locks, deadlock detection, transaction completion.
//!
//! # Components
//! - [`LockManager`] - Shared/exclusive page locks under strict two-phase locking
//! - [`WaitForGraph`] - Waiter → holder edges searched for cycles before any wait
//! - [`TransactionCoordinator`] - Commit (force) and abort (before-image restore)

mod lock_manager;
mod transaction;
mod wait_for_graph;

pub use lock_manager::{LockManager, LockMode, LockStats, LockStatsSnapshot};
pub use transaction::{Transaction, TransactionCoordinator, TransactionState};
pub use wait_for_graph::WaitForGraph;
