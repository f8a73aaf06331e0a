//! Replay-of-latest status fan-out.

use crate::{RunningState, StatusUpdate};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;
use tracing::debug;

/// Publishes [`StatusUpdate`]s to every attached observer.
///
/// Each observer owns an unbounded queue, so a slow observer never holds up
/// publication and never loses a value. A new observer is seeded with the
/// latest value under the same lock that publication takes, so it sees
/// every later value exactly once.
pub struct StatusBroadcaster {
    inner: Arc<Mutex<BroadcasterInner>>,
}

struct BroadcasterInner {
    latest: StatusUpdate,
    next_subscriber_id: u64,
    subscribers: HashMap<u64, mpsc::UnboundedSender<StatusUpdate>>,
}

impl StatusBroadcaster {
    pub fn new() -> Self {
        Self::with_initial(StatusUpdate::initial())
    }

    pub fn with_initial(initial: StatusUpdate) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BroadcasterInner {
                latest: initial,
                next_subscriber_id: 0,
                subscribers: HashMap::new(),
            })),
        }
    }

    /// Attach an observer. The latest value is already queued when this returns.
    pub fn subscribe(&self) -> StatusSubscription {
        let mut inner = lock(&self.inner);

        let (sender, receiver) = mpsc::unbounded_channel();
        // The receiver is alive, so this cannot fail.
        let _ = sender.send(inner.latest.clone());

        let id = inner.next_subscriber_id;
        inner.next_subscriber_id += 1;
        inner.subscribers.insert(id, sender);

        debug!(
            "Observer {id} attached ({} total observers)",
            inner.subscribers.len()
        );

        StatusSubscription {
            id,
            receiver,
            broadcaster: Arc::downgrade(&self.inner),
        }
    }

    /// Record a new transition and queue it for every attached observer.
    pub fn publish(&self, state: RunningState, message: String) -> StatusUpdate {
        let mut inner = lock(&self.inner);

        let update = StatusUpdate {
            sequence: inner.latest.sequence + 1,
            state,
            message,
        };
        inner.latest = update.clone();

        // A closed receiver means the observer is already gone.
        inner
            .subscribers
            .retain(|_, sender| sender.send(update.clone()).is_ok());

        debug!(
            "Published #{} {} to {} observers",
            update.sequence,
            update.state,
            inner.subscribers.len()
        );

        update
    }

    pub fn latest(&self) -> StatusUpdate {
        lock(&self.inner).latest.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

impl Default for StatusBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StatusBroadcaster {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// An attached observer. Dropping it detaches.
pub struct StatusSubscription {
    id: u64,
    receiver: mpsc::UnboundedReceiver<StatusUpdate>,
    broadcaster: Weak<Mutex<BroadcasterInner>>,
}

impl StatusSubscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next update in publication order.
    ///
    /// Returns `None` once the broadcaster is gone and the queue is drained.
    pub async fn recv(&mut self) -> Option<StatusUpdate> {
        self.receiver.recv().await
    }

    /// Next already-queued update, if any.
    pub fn try_recv(&mut self) -> Option<StatusUpdate> {
        self.receiver.try_recv().ok()
    }

    /// Drain everything queued so far and return the newest value.
    pub fn latest_queued(&mut self) -> Option<StatusUpdate> {
        let mut newest = None;
        while let Some(update) = self.try_recv() {
            newest = Some(update);
        }
        newest
    }

    pub fn detach(self) {}
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.broadcaster.upgrade() {
            let mut inner = lock(&inner);
            if inner.subscribers.remove(&self.id).is_some() {
                debug!(
                    "Observer {} detached ({} remaining observers)",
                    self.id,
                    inner.subscribers.len()
                );
            }
        }
    }
}

// Critical sections only touch in-memory maps, so a poisoned lock still holds consistent data.
fn lock(inner: &Mutex<BroadcasterInner>) -> MutexGuard<'_, BroadcasterInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
