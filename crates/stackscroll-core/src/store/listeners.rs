//! Auth change listener registry.
//!
//! Each registration returns a [`Subscription`]; dropping it (or calling
//! [`Subscription::unsubscribe`]) removes the listener. Because `unsubscribe`
//! consumes the handle, a listener can only ever be released once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::AuthEvent;
use crate::models::Session;

/// Callback invoked with the event and the session after it.
pub type AuthListener = Arc<dyn Fn(AuthEvent, Option<&Session>) + Send + Sync>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<(u64, AuthListener)>,
}

/// Registry owned by an [`AuthBackend`](super::AuthBackend) implementation.
#[derive(Default, Clone)]
pub struct AuthListeners {
    table: Arc<Mutex<ListenerTable>>,
}

impl AuthListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` and returns its release handle.
    pub fn subscribe(&self, listener: AuthListener) -> Subscription {
        let mut table = lock(&self.table);
        let id = table.next_id;
        table.next_id = table.next_id.wrapping_add(1);
        table.entries.push((id, listener));
        Subscription {
            id,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Calls every registered listener.
    ///
    /// Listeners run outside the registry lock so they may subscribe or
    /// unsubscribe without deadlocking.
    pub fn notify(&self, event: AuthEvent, session: Option<&Session>) {
        let listeners: Vec<AuthListener> = lock(&self.table)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        tracing::debug!(?event, listeners = listeners.len(), "auth event");
        for listener in listeners {
            listener(event, session);
        }
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        lock(&self.table).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Release handle for one listener registration.
#[must_use = "dropping a Subscription unregisters the listener"]
pub struct Subscription {
    id: u64,
    table: Weak<Mutex<ListenerTable>>,
}

impl Subscription {
    /// Unregisters the listener.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            lock(&table).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

fn lock(table: &Mutex<ListenerTable>) -> MutexGuard<'_, ListenerTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}
