use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::model::{ClientId, ClientSubscription};

/// `clientId → ClientSubscription`, mutex-guarded (spec §3, §4.5).
///
/// Each subscription is additionally wrapped in its own `Arc<Mutex<_>>`.
/// The outer lock serializes structural changes to the map (insert,
/// remove, lookup, timer-handle swap); the inner lock serializes reads
/// and writes of one client's own baselines. Exactly one dispatch task
/// is ever live for a given client at a time, so the inner lock is
/// never contended in practice. Callers must take the inner lock only
/// around the in-memory baseline diff/update, never across the store
/// read or the outbound send that surround it (spec §5).
pub struct SubscriptionRegistry {
    entries: Mutex<HashMap<ClientId, Arc<Mutex<ClientSubscription>>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a clone of the client's subscription handle, if any,
    /// without holding the outer lock any longer than the lookup.
    pub async fn get(&self, client_id: ClientId) -> Option<Arc<Mutex<ClientSubscription>>> {
        self.entries.lock().await.get(&client_id).cloned()
    }

    /// Installs (or replaces) a client's subscription and returns the
    /// new handle.
    pub async fn insert(
        &self,
        client_id: ClientId,
        subscription: ClientSubscription,
    ) -> Arc<Mutex<ClientSubscription>> {
        let handle = Arc::new(Mutex::new(subscription));
        self.entries.lock().await.insert(client_id, Arc::clone(&handle));
        handle
    }

    /// Stops the client's timer (if any) and removes the entry.
    /// Idempotent: a second call on an already-removed client is a
    /// no-op (spec §8).
    pub async fn remove(&self, client_id: ClientId) {
        let handle = self.entries.lock().await.remove(&client_id);
        if let Some(handle) = handle {
            let mut sub = handle.lock().await;
            if let Some(task) = sub.task.take() {
                task.stop();
            }
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
