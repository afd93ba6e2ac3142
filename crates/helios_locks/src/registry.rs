//! Keyed FIFO mutex registry.
//!
//! One registry instance owns every named lock in the process. A lock
//! is created lazily the first time its key is acquired and lives until
//! [`LockRegistry::prune`] finds it idle; key space is bounded by
//! active game and player ids, so the table stays small in practice.
//!
//! Waiters queue per key in arrival order and are granted strictly
//! FIFO. Enqueueing happens synchronously under the registry's internal
//! mutex, so [`LockRegistry::acquire_many`] can register a whole key
//! set atomically: two tasks requesting overlapping sets observe the
//! same relative order on every shared key, which is what keeps the
//! multi-key services in [`crate::services`] free of circular waits.
//!
//! Acquisition never fails; the only failure mode is waiting forever on
//! a holder that never releases, which is the caller's bug to avoid.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::oneshot;
use tracing::debug;

/// Proof of ownership of one keyed lock.
///
/// Redeemable for release exactly once; releasing a ticket that was
/// already redeemed (or never issued) is a no-op, never a fault.
#[derive(Debug)]
pub struct LockTicket {
    key: String,
    ticket: u64,
}

impl LockTicket {
    /// The key this ticket locks.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Per-key lock state.
#[derive(Debug, Default)]
struct KeyState {
    /// Ticket id of the current holder, if any.
    holder: Option<u64>,
    /// Waiters in arrival order. The sender is dropped if the waiting
    /// future is cancelled, in which case the grant skips to the next.
    waiters: VecDeque<(u64, oneshot::Sender<()>)>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    locks: HashMap<String, KeyState>,
    next_ticket: u64,
}

impl RegistryInner {
    fn alloc_ticket(&mut self) -> u64 {
        let id = self.next_ticket;
        self.next_ticket += 1;
        id
    }

    /// Grant or enqueue one key. Returns the receiver to await when the
    /// key is currently held.
    fn request(&mut self, key: &str, ticket: u64) -> Option<oneshot::Receiver<()>> {
        let state = self.locks.entry(key.to_owned()).or_default();
        if state.holder.is_none() && state.waiters.is_empty() {
            state.holder = Some(ticket);
            None
        } else {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back((ticket, tx));
            Some(rx)
        }
    }
}

/// Process-wide registry of named, FIFO-fair async locks.
///
/// Intended to be created once and shared (`Arc`) with every service
/// that needs locking. Not re-entrant: a task that already holds a key
/// and acquires it again deadlocks with itself — an explicit caller
/// contract, not a bug this registry papers over.
#[derive(Debug, Default)]
pub struct LockRegistry {
    inner: Mutex<RegistryInner>,
}

impl LockRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, RegistryInner> {
        // The inner mutex only guards map bookkeeping and is never held
        // across an await; poisoning would mean a panic inside that
        // bookkeeping.
        self.inner.lock().expect("lock registry mutex poisoned")
    }

    /// Acquire the lock for `key`, suspending until it is free.
    ///
    /// Grants immediately when the key is unheld. Never fails.
    pub async fn acquire(&self, key: impl Into<String>) -> LockTicket {
        let key = key.into();
        let (ticket, pending) = {
            let mut inner = self.inner();
            let ticket = inner.alloc_ticket();
            (ticket, inner.request(&key, ticket))
        };

        if let Some(rx) = pending {
            debug!(key = %key, ticket, "waiting for lock");
            // The sender lives in the registry until granted; prune
            // never evicts a key with waiters.
            rx.await.expect("lock waiter dropped by registry");
        }

        debug!(key = %key, ticket, "lock acquired");
        LockTicket { key, ticket }
    }

    /// Acquire several keys in one request.
    ///
    /// All keys are registered atomically (granted or enqueued under a
    /// single pass of the registry), then awaited together. Two
    /// overlapping `acquire_many` calls therefore queue in the same
    /// relative order on every key they share and cannot deadlock
    /// against each other. Keys must be distinct: requesting the same
    /// key twice in one call waits on itself.
    ///
    /// Returned tickets correspond to `keys` positionally.
    pub async fn acquire_many(&self, keys: &[String]) -> Vec<LockTicket> {
        let requests: Vec<(String, u64, Option<oneshot::Receiver<()>>)> = {
            let mut inner = self.inner();
            keys.iter()
                .map(|key| {
                    let ticket = inner.alloc_ticket();
                    let pending = inner.request(key, ticket);
                    (key.clone(), ticket, pending)
                })
                .collect()
        };

        let mut tickets = Vec::with_capacity(requests.len());
        let mut waits = Vec::new();
        for (key, ticket, pending) in requests {
            if let Some(rx) = pending {
                waits.push(rx);
            }
            tickets.push(LockTicket { key, ticket });
        }

        for granted in futures::future::join_all(waits).await {
            granted.expect("lock waiter dropped by registry");
        }

        debug!(count = tickets.len(), "lock set acquired");
        tickets
    }

    /// Release a lock, waking the next waiter on its key (FIFO).
    ///
    /// A ticket that does not match the current holder — already
    /// redeemed, never granted, or plain unknown — is silently ignored.
    pub fn release(&self, ticket: LockTicket) {
        let mut inner = self.inner();
        let Some(state) = inner.locks.get_mut(&ticket.key) else {
            return;
        };
        if state.holder != Some(ticket.ticket) {
            return;
        }

        state.holder = None;
        // Hand over to the first waiter still listening.
        while let Some((next, tx)) = state.waiters.pop_front() {
            if tx.send(()).is_ok() {
                state.holder = Some(next);
                break;
            }
            // Waiter cancelled while queued; skip it.
        }

        debug!(key = %ticket.key, ticket = ticket.ticket, "lock released");
    }

    /// Drop registry entries that are unheld and unwaited.
    ///
    /// The key table otherwise lives for the process lifetime; hosts
    /// should call this periodically (e.g., when a game ends) so keys
    /// for finished games do not accumulate. Returns how many entries
    /// were dropped.
    pub fn prune(&self) -> usize {
        let mut inner = self.inner();
        let before = inner.locks.len();
        inner
            .locks
            .retain(|_, state| state.holder.is_some() || !state.waiters.is_empty());
        let dropped = before - inner.locks.len();
        if dropped > 0 {
            debug!(dropped, "pruned idle lock entries");
        }
        dropped
    }

    /// Number of waiters currently queued on `key` (holder excluded).
    #[must_use]
    pub fn waiter_count(&self, key: &str) -> usize {
        self.inner()
            .locks
            .get(key)
            .map_or(0, |state| state.waiters.len())
    }

    /// Whether `key` is currently held.
    #[must_use]
    pub fn is_held(&self, key: &str) -> bool {
        self.inner()
            .locks
            .get(key)
            .is_some_and(|state| state.holder.is_some())
    }
}
