use parking_lot::Mutex;
use std::{collections::HashMap, hash::Hash, sync::Arc, time::Duration};
use tokio::task::JoinHandle;

type Action = Box<dyn FnOnce() + Send>;

struct Pending {
    handle: JoinHandle<()>,
    slot: Arc<Mutex<Option<Action>>>,
}

/// Collapses a burst of triggers within a window into one deferred action,
/// keyed by an arbitrary id. Scheduling again under the same key before the
/// delay elapses cancels the earlier pending action rather than running both
/// (used for debounced strategy performance persistence writes).
pub struct Debouncer<K> {
    delay: Duration,
    pending: Mutex<HashMap<K, Pending>>,
}

impl<K> std::fmt::Debug for Debouncer<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer").field("delay", &self.delay).finish()
    }
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Schedule `action` to run after `delay`, cancelling any action already
    /// pending under `key`.
    pub fn schedule<F>(&self, key: K, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let slot: Arc<Mutex<Option<Action>>> = Arc::new(Mutex::new(Some(Box::new(action))));
        let slot_for_task = slot.clone();
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(action) = slot_for_task.lock().take() {
                action();
            }
        });

        let previous = self.pending.lock().insert(key, Pending { handle, slot });
        if let Some(previous) = previous {
            previous.handle.abort();
        }
    }

    /// Immediately run and remove the pending action for `key`, if any.
    pub fn flush(&self, key: &K) {
        let entry = self.pending.lock().remove(key);
        if let Some(entry) = entry {
            entry.handle.abort();
            if let Some(action) = entry.slot.lock().take() {
                action();
            }
        }
    }

    /// Immediately run and remove every pending action (used on engine stop).
    pub fn flush_all(&self) {
        let entries: Vec<_> = self.pending.lock().drain().map(|(_, v)| v).collect();
        for entry in entries {
            entry.handle.abort();
            if let Some(action) = entry.slot.lock().take() {
                action();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn flush_all_runs_pending_action_immediately() {
        let debouncer: Debouncer<&'static str> = Debouncer::new(Duration::from_secs(2));
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        debouncer.schedule("strategy-1", move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        debouncer.flush_all();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rescheduling_cancels_previous_action() {
        let debouncer: Debouncer<&'static str> = Debouncer::new(Duration::from_millis(50));
        let counter = Arc::new(AtomicUsize::new(0));

        let c1 = counter.clone();
        debouncer.schedule("strategy-1", move || {
            c1.fetch_add(100, Ordering::SeqCst);
        });

        let c2 = counter.clone();
        debouncer.schedule("strategy-1", move || {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
