//! Lock Manager - page-level shared/exclusive locks with deadlock detection.
//!
//! The [`LockManager`] provides:
//! - Shared/exclusive locks keyed by [`PageId`]
//! - Upgrade from a sole shared lock to exclusive
//! - The set of pages each transaction holds locks on
//! - Deadlock detection by wait-for-graph cycle search before every wait

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::common::{Error, PageId, Result, TransactionId};
use crate::concurrency::WaitForGraph;

/// Access mode requested on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    /// Read-only access; compatible with other shared holders.
    Shared,
    /// Read-write access; excludes every other transaction.
    Exclusive,
}

/// Lock held on one page. Unlocked pages have no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LockState {
    Shared(HashSet<TransactionId>),
    Exclusive(TransactionId),
}

/// Everything guarded by the lock manager's mutex.
///
/// Lock states, held-page sets and the wait-for graph change together, so no
/// thread ever observes one updated without the others.
#[derive(Debug, Default)]
struct LockTable {
    locks: HashMap<PageId, LockState>,
    held: HashMap<TransactionId, HashSet<PageId>>,
    waits: WaitForGraph,
}

impl LockTable {
    /// Transactions that must release before `tid` can lock `page_id` in `mode`.
    fn blockers(&self, tid: TransactionId, page_id: PageId, mode: LockMode) -> HashSet<TransactionId> {
        match (self.locks.get(&page_id), mode) {
            (None, _) => HashSet::new(),
            (Some(LockState::Exclusive(holder)), _) if *holder == tid => HashSet::new(),
            (Some(LockState::Exclusive(holder)), _) => HashSet::from([*holder]),
            (Some(LockState::Shared(_)), LockMode::Shared) => HashSet::new(),
            (Some(LockState::Shared(holders)), LockMode::Exclusive) => {
                holders.iter().copied().filter(|&h| h != tid).collect()
            }
        }
    }

    fn grant(&mut self, tid: TransactionId, page_id: PageId, mode: LockMode) {
        match mode {
            LockMode::Exclusive => {
                self.locks.insert(page_id, LockState::Exclusive(tid));
            }
            LockMode::Shared => {
                let state = self
                    .locks
                    .entry(page_id)
                    .or_insert_with(|| LockState::Shared(HashSet::new()));
                // An exclusive holder reading its own page keeps the exclusive lock.
                if let LockState::Shared(holders) = state {
                    holders.insert(tid);
                }
            }
        }
        self.held.entry(tid).or_default().insert(page_id);
        self.waits.clear_waits(tid);
    }

    /// Returns true if `tid` held a lock on `page_id`.
    fn release(&mut self, tid: TransactionId, page_id: PageId) -> bool {
        let released = match self.locks.get_mut(&page_id) {
            Some(LockState::Exclusive(holder)) if *holder == tid => {
                self.locks.remove(&page_id);
                true
            }
            Some(LockState::Shared(holders)) => {
                let removed = holders.remove(&tid);
                if holders.is_empty() {
                    self.locks.remove(&page_id);
                }
                removed
            }
            _ => false,
        };

        if let Some(pages) = self.held.get_mut(&tid) {
            pages.remove(&page_id);
            if pages.is_empty() {
                self.held.remove(&tid);
            }
        }
        if released {
            self.waits.clear_waits_on(tid);
        }
        released
    }
}

/// Lock manager statistics.
#[derive(Debug, Default)]
pub struct LockStats {
    /// Locks granted (including re-grants of locks already held).
    pub grants: AtomicU64,
    /// Acquire calls that had to wait at least once.
    pub waits: AtomicU64,
    /// Acquire calls refused because of a deadlock.
    pub deadlocks: AtomicU64,
}

impl LockStats {
    pub fn snapshot(&self) -> LockStatsSnapshot {
        LockStatsSnapshot {
            grants: self.grants.load(Ordering::Relaxed),
            waits: self.waits.load(Ordering::Relaxed),
            deadlocks: self.deadlocks.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`LockStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockStatsSnapshot {
    pub grants: u64,
    pub waits: u64,
    pub deadlocks: u64,
}

/// Grants page locks to transactions under strict two-phase locking.
///
/// # Thread Safety
/// - `table`: `Mutex`: lock states, held sets and wait-for graph together
/// - `released`: `Condvar`: signalled on every release; waiters re-validate
/// - `stats`: no lock, all atomic counters
///
/// The mutex is only held for state transitions, never while a thread is
/// parked, so waiting on one page does not stall requests for other pages.
///
/// # Fairness
/// None. Whichever waiter re-validates first after a release proceeds.
#[derive(Debug, Default)]
pub struct LockManager {
    table: Mutex<LockTable>,
    released: Condvar,
    stats: LockStats,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a lock on `page_id` for `tid`, blocking until it is granted.
    ///
    /// Before every wait the wait-for graph is updated with the current
    /// holders and searched for a cycle through `tid`.
    ///
    /// # Errors
    /// `Error::Deadlock` if waiting would deadlock. The caller must then
    /// abort the transaction.
    pub fn acquire(&self, tid: TransactionId, page_id: PageId, mode: LockMode) -> Result<()> {
        let mut table = self.table.lock();
        let mut waited = false;

        loop {
            let blockers = table.blockers(tid, page_id, mode);
            if blockers.is_empty() {
                table.grant(tid, page_id, mode);
                self.stats.grants.fetch_add(1, Ordering::Relaxed);
                debug!(txn = %tid, page = %page_id, ?mode, "lock granted");
                return Ok(());
            }

            table.waits.set_waits(tid, blockers);
            if table.waits.has_cycle_from(tid) {
                table.waits.clear_waits(tid);
                self.stats.deadlocks.fetch_add(1, Ordering::Relaxed);
                warn!(txn = %tid, page = %page_id, ?mode, "deadlock detected, aborting requester");
                return Err(Error::Deadlock(tid));
            }

            if !waited {
                waited = true;
                self.stats.waits.fetch_add(1, Ordering::Relaxed);
                debug!(
                    txn = %tid,
                    page = %page_id,
                    ?mode,
                    holders = ?table.waits.waiting_on(tid),
                    "waiting for lock"
                );
            }
            self.released.wait(&mut table);
        }
    }

    /// Release `tid`'s lock on `page_id`, if any.
    pub fn release(&self, tid: TransactionId, page_id: PageId) {
        let released = self.table.lock().release(tid, page_id);
        if released {
            self.released.notify_all();
        }
    }

    /// Release every lock `tid` holds and forget its held-page set.
    pub fn release_all(&self, tid: TransactionId) {
        {
            let mut table = self.table.lock();
            let pages: Vec<PageId> = table
                .held
                .get(&tid)
                .map(|p| p.iter().copied().collect())
                .unwrap_or_default();
            for page_id in pages {
                table.release(tid, page_id);
            }
            table.held.remove(&tid);
            table.waits.clear_waits(tid);
            table.waits.clear_waits_on(tid);
        }
        self.released.notify_all();
    }

    /// True if `tid` holds any lock on `page_id`.
    pub fn holds_lock(&self, tid: TransactionId, page_id: PageId) -> bool {
        self.table
            .lock()
            .held
            .get(&tid)
            .is_some_and(|pages| pages.contains(&page_id))
    }

    /// The mode `tid` holds `page_id` in, if any.
    pub fn lock_mode(&self, tid: TransactionId, page_id: PageId) -> Option<LockMode> {
        match self.table.lock().locks.get(&page_id)? {
            LockState::Exclusive(holder) if *holder == tid => Some(LockMode::Exclusive),
            LockState::Shared(holders) if holders.contains(&tid) => Some(LockMode::Shared),
            _ => None,
        }
    }

    /// Every page `tid` holds a lock on, sorted.
    pub fn held_pages(&self, tid: TransactionId) -> Vec<PageId> {
        let mut pages: Vec<PageId> = self
            .table
            .lock()
            .held
            .get(&tid)
            .map(|p| p.iter().copied().collect())
            .unwrap_or_default();
        pages.sort();
        pages
    }

    /// Transactions `tid` is currently blocked on (empty if not waiting).
    pub fn waiting_on(&self, tid: TransactionId) -> Vec<TransactionId> {
        self.table.lock().waits.waiting_on(tid)
    }

    /// Lock statistics.
    pub fn stats(&self) -> &LockStats {
        &self.stats
    }
}
