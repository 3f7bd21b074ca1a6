use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::ConnectionEvent;

pub(super) type Listener = Arc<dyn Fn(&ConnectionEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

/// Listeners in registration order.
#[derive(Default)]
pub(super) struct ListenerRegistry {
    entries: Mutex<Vec<(ListenerId, Listener)>>,
}

impl ListenerRegistry {
    fn lock(&self) -> MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(super) fn insert(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(Uuid::new_v4());
        self.lock().push((id, listener));
        id
    }

    pub(super) fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    pub(super) fn clear(&self) {
        self.lock().clear();
    }

    pub(super) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Cloned out so callbacks run without the lock held and may unsubscribe themselves.
    pub(super) fn snapshot(&self) -> Vec<Listener> {
        self.lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}
