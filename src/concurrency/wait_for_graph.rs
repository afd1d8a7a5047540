//! Wait-for graph and deadlock detection.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::common::TransactionId;

/// Directed graph of blocked transactions.
///
/// An edge `a -> b` means `a` is stalled on a lock held by `b`. Edges only
/// exist while `a` is inside `acquire`.
#[derive(Debug, Default)]
pub struct WaitForGraph {
    edges: HashMap<TransactionId, HashSet<TransactionId>>,
}

impl WaitForGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every edge leaving `waiter` with edges to `holders`.
    pub fn set_waits(&mut self, waiter: TransactionId, holders: HashSet<TransactionId>) {
        if holders.is_empty() {
            self.edges.remove(&waiter);
        } else {
            self.edges.insert(waiter, holders);
        }
    }

    /// Drop every edge leaving `waiter`.
    pub fn clear_waits(&mut self, waiter: TransactionId) {
        self.edges.remove(&waiter);
    }

    /// Drop every edge pointing at `holder`.
    ///
    /// Waiters re-derive their edges when they wake, so edges into a
    /// transaction that just released something are stale until then.
    pub fn clear_waits_on(&mut self, holder: TransactionId) {
        self.edges.retain(|_, holders| {
            holders.remove(&holder);
            !holders.is_empty()
        });
    }

    /// Transactions `waiter` is currently blocked on.
    pub fn waiting_on(&self, waiter: TransactionId) -> Vec<TransactionId> {
        let mut holders: Vec<TransactionId> = self
            .edges
            .get(&waiter)
            .map(|h| h.iter().copied().collect())
            .unwrap_or_default();
        holders.sort();
        holders
    }

    /// Breadth-first search from `start`; true if `start` is reachable from itself.
    pub fn has_cycle_from(&self, start: TransactionId) -> bool {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<TransactionId> = VecDeque::new();
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let Some(next) = self.edges.get(&current) else {
                continue;
            };
            for &holder in next {
                if holder == start {
                    return true;
                }
                if visited.insert(holder) {
                    queue.push_back(holder);
                }
            }
        }
        false
    }
}
