//! Transaction completion: force-on-commit, before-image undo on abort.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::buffer::PageCache;
use crate::common::{Result, TransactionId};

/// Lifecycle of a transaction as seen by the storage core.
///
/// `Active → Committing → Committed` or `Active → Aborting → Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committing,
    Committed,
    Aborting,
    Aborted,
}

impl TransactionState {
    /// True once the transaction has committed or aborted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionState::Committed | TransactionState::Aborted)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionState::Active => "active",
            TransactionState::Committing => "committing",
            TransactionState::Committed => "committed",
            TransactionState::Aborting => "aborting",
            TransactionState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// A transaction handle: its id plus the state it has reached.
#[derive(Debug)]
pub struct Transaction {
    id: TransactionId,
    state: TransactionState,
}

impl Transaction {
    /// Start tracking `id` as an active transaction.
    pub fn new(id: TransactionId) -> Self {
        Self {
            id,
            state: TransactionState::Active,
        }
    }

    #[inline]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> TransactionState {
        self.state
    }
}

/// Commits and aborts transactions against a shared [`PageCache`].
///
/// Commit flushes every resident page the transaction holds a lock on and
/// refreshes its before-image. Abort restores every resident page the
/// transaction dirtied. Either way every lock is released afterwards, even
/// when a flush fails; the first error is then returned and some pages may
/// already be on disk.
pub struct TransactionCoordinator {
    cache: Arc<PageCache>,
}

impl TransactionCoordinator {
    pub fn new(cache: Arc<PageCache>) -> Self {
        Self { cache }
    }

    /// Finish `tid`: commit if `commit`, otherwise roll back.
    ///
    /// Completing an id twice is harmless: the second call finds no locks.
    ///
    /// # Errors
    /// Store errors from a commit flush. Locks are released regardless.
    pub fn complete(&self, tid: TransactionId, commit: bool) -> Result<()> {
        let locks = self.cache.lock_manager();
        let pages = locks.held_pages(tid);

        let outcome = if commit {
            self.cache.commit_pages(tid, &pages)
        } else {
            self.cache.rollback_pages(tid, &pages);
            Ok(())
        };

        locks.release_all(tid);

        match &outcome {
            Ok(()) if commit => debug!(txn = %tid, pages = pages.len(), "transaction committed"),
            Ok(()) => debug!(txn = %tid, pages = pages.len(), "transaction aborted"),
            Err(e) => warn!(txn = %tid, error = %e, "commit failed, locks released"),
        }
        outcome
    }

    /// Begin a transaction with a fresh id.
    pub fn begin(&self) -> Transaction {
        let txn = Transaction::new(TransactionId::fresh());
        debug!(txn = %txn.id, "transaction started");
        txn
    }

    /// Commit `txn`. On failure it stays in `Committing`.
    pub fn commit(&self, txn: &mut Transaction) -> Result<()> {
        txn.state = TransactionState::Committing;
        self.complete(txn.id, true)?;
        txn.state = TransactionState::Committed;
        Ok(())
    }

    /// Abort `txn`.
    pub fn abort(&self, txn: &mut Transaction) -> Result<()> {
        txn.state = TransactionState::Aborting;
        self.complete(txn.id, false)?;
        txn.state = TransactionState::Aborted;
        Ok(())
    }
}
