//! Subscriber registry
//!
//! Listeners are kept in subscription order and called synchronously with the
//! snapshot taken after a mutation. A listener that panics is logged and
//! skipped; the remaining listeners still receive the snapshot.
//!
//! Snapshots go through a FIFO queue. Only one caller delivers at a time: a
//! mutation made from inside a listener queues its snapshot and returns, and
//! the outer delivery loop hands it to every listener after the current one.
//! Each listener therefore sees snapshots in mutation order and its last one
//! matches the store.

use std::collections::{BTreeMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::{debug, error};

use super::state::ProgressionState;

/// Callback invoked with every new snapshot
pub type Listener = Arc<dyn Fn(&ProgressionState) + Send + Sync>;

/// Identifies one subscription, increasing in subscription order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<SubscriptionId, Listener>,
}

#[derive(Default)]
struct Outbox {
    delivering: bool,
    pending: VecDeque<ProgressionState>,
}

/// Shared list of listeners
#[derive(Clone, Default)]
pub struct Subscribers {
    registry: Arc<Mutex<Registry>>,
    outbox: Arc<Mutex<Outbox>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.insert(id, listener);
        debug!(subscription = id.0, "Listener subscribed");

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn len(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue `snapshot` for delivery.
    ///
    /// Call while the state lock is held so the queue order is the mutation
    /// order.
    pub fn publish(&self, snapshot: ProgressionState) {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .push_back(snapshot);
    }

    /// Deliver queued snapshots, oldest first, to every current listener in
    /// subscription order.
    ///
    /// Returns immediately when another call is already delivering; that call
    /// picks up whatever was queued. No lock is held while a listener runs, so
    /// listeners may subscribe, unsubscribe or trigger further mutations.
    /// Returns the number of listener calls that panicked.
    pub fn deliver(&self) -> usize {
        {
            let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
            if outbox.delivering {
                debug!(queued = outbox.pending.len(), "Delivery in progress, snapshot queued");
                return 0;
            }
            outbox.delivering = true;
        }

        let mut failed = 0;
        loop {
            let snapshot = {
                let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
                match outbox.pending.pop_front() {
                    Some(snapshot) => snapshot,
                    None => {
                        outbox.delivering = false;
                        break;
                    }
                }
            };
            failed += self.notify_all(&snapshot);
        }
        failed
    }

    fn notify_all(&self, snapshot: &ProgressionState) -> usize {
        let listeners: Vec<(SubscriptionId, Listener)> = {
            let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry
                .listeners
                .iter()
                .map(|(id, listener)| (*id, Arc::clone(listener)))
                .collect()
        };

        let mut failed = 0;
        for (id, listener) in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(snapshot))).is_err() {
                error!(subscription = id.0, "Progression listener panicked");
                failed += 1;
            }
        }
        failed
    }
}

/// Handle returned by [`Subscribers::subscribe`].
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "keep the handle to be able to unsubscribe"]
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Remove exactly this listener. Returns false if the store is already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .remove(&self.id)
            .is_some();
        debug!(subscription = self.id.0, "Listener unsubscribed");
        removed
    }
}
