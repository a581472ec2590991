use std::sync::{Arc, Mutex, MutexGuard, Weak};

use super::snapshot::StoreSnapshot;

pub type Listener = Arc<dyn Fn(&StoreSnapshot) + Send + Sync>;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

impl ListenerRegistry {
    fn insert(&mut self, listener: Listener) -> u64 {
        self.next_id += 1;
        self.entries.push((self.next_id, listener));
        self.next_id
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }
}

pub(crate) type SharedRegistry = Arc<Mutex<ListenerRegistry>>;

fn lock(registry: &Mutex<ListenerRegistry>) -> MutexGuard<'_, ListenerRegistry> {
    registry
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn register(registry: &SharedRegistry, listener: Listener) -> Subscription {
    let id = lock(registry).insert(listener);
    Subscription {
        id,
        registry: Arc::downgrade(registry),
    }
}

/// Deliver `snapshot` to every listener registered when fan-out starts.
///
/// The registry lock is released before the first call, so listeners may subscribe or
/// unsubscribe while being notified.
pub(crate) fn broadcast(registry: &SharedRegistry, snapshot: &StoreSnapshot) -> usize {
    let listeners: Vec<Listener> = lock(registry)
        .entries
        .iter()
        .map(|(_, listener)| Arc::clone(listener))
        .collect();
    for listener in &listeners {
        listener(snapshot);
    }
    listeners.len()
}

pub(crate) fn listener_count(registry: &SharedRegistry) -> usize {
    lock(registry).entries.len()
}

/// Handle returned by [`StaffingStore::subscribe`](super::StaffingStore::subscribe).
///
/// Dropping the handle keeps the listener registered; call [`Subscription::unsubscribe`]
/// to remove it.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl Subscription {
    /// Returns `false` when the listener was already removed or the store is gone.
    pub fn unsubscribe(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => lock(&registry).remove(self.id),
            None => false,
        }
    }
}
