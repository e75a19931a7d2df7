use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::error::Result;
use crate::state::StateStore;

pub type SubscriberId = u64;

/// A live connection able to receive pushed snapshots.
///
/// Push must be bounded: the WebSocket implementation hands the payload to a
/// bounded channel and treats a full or closed channel as failure, so one
/// slow client can never stall a broadcast pass.
#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn push(&self, payload: &str) -> Result<()>;
}

/// Tracks the set of currently connected subscribers and fans the latest
/// snapshot out to all of them.
///
/// The subscriber set has its own lock, deliberately distinct from the state
/// store's, so fan-out never happens under the data lock. Holding the set
/// lock for the duration of one pass makes membership changes linearizable
/// with respect to push attempts.
pub struct BroadcastHub {
    store: Arc<StateStore>,
    subscribers: Mutex<HashMap<SubscriberId, Arc<dyn Subscriber>>>,
    next_id: AtomicU64,
}

impl BroadcastHub {
    pub fn new(store: Arc<StateStore>) -> Self {
        BroadcastHub {
            store,
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Add a subscriber and immediately push the current snapshot to it
    /// alone, so new connections are never stale until the next change.
    pub async fn register(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().await.insert(id, subscriber.clone());
        debug!(subscriber = id, "subscriber registered");

        if let Some(payload) = self.render() {
            if let Err(err) = subscriber.push(&payload).await {
                debug!(subscriber = id, error = %err, "catch-up push failed");
                self.unregister(id).await;
            }
        }
        id
    }

    /// Remove a subscriber. Removing one that is already gone is a no-op.
    pub async fn unregister(&self, id: SubscriberId) {
        if self.subscribers.lock().await.remove(&id).is_some() {
            debug!(subscriber = id, "subscriber unregistered");
        }
    }

    /// Push one snapshot to every registered subscriber.
    ///
    /// The snapshot is serialized once, so every subscriber in a pass gets a
    /// byte-identical payload. A failed push removes that subscriber and
    /// never aborts delivery to the rest.
    pub async fn broadcast(&self) {
        let Some(payload) = self.render() else {
            return;
        };

        let mut subscribers = self.subscribers.lock().await;
        let mut dead = Vec::new();
        for (id, subscriber) in subscribers.iter() {
            if let Err(err) = subscriber.push(&payload).await {
                debug!(subscriber = *id, error = %err, "push failed, pruning subscriber");
                dead.push(*id);
            }
        }
        for id in dead {
            subscribers.remove(&id);
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    fn render(&self) -> Option<String> {
        match serde_json::to_string(&self.store.snapshot()) {
            Ok(payload) => Some(payload),
            Err(err) => {
                error!(error = %err, "snapshot serialization failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::quote::{SourceData, SpotQuote};
    use std::sync::Mutex as StdMutex;

    /// In-memory subscriber implementing the same push contract as the
    /// WebSocket one, optionally failing every push.
    struct FakeSubscriber {
        received: StdMutex<Vec<String>>,
        fail: bool,
    }

    impl FakeSubscriber {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(FakeSubscriber {
                received: StdMutex::new(Vec::new()),
                fail,
            })
        }

        fn received(&self) -> Vec<String> {
            self.received.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Subscriber for FakeSubscriber {
        async fn push(&self, payload: &str) -> Result<()> {
            if self.fail {
                return Err(Error::SubscriberClosed);
            }
            self.received.lock().unwrap().push(payload.to_string());
            Ok(())
        }
    }

    fn apply_spot(store: &StateStore, price: f64) {
        store.apply(SourceData::Spot(SpotQuote {
            kind: SpotQuote::KIND.to_string(),
            price,
            change: String::new(),
            change_percent: String::new(),
            update_time: "10:00:00".to_string(),
        }));
    }

    #[tokio::test]
    async fn register_pushes_current_snapshot_immediately() {
        let store = Arc::new(StateStore::new());
        apply_spot(&store, 2400.0);
        let hub = BroadcastHub::new(store);

        let sub = FakeSubscriber::new(false);
        hub.register(sub.clone()).await;

        let received = sub.received();
        assert_eq!(received.len(), 1);
        assert!(received[0].contains("2400"));
    }

    #[tokio::test]
    async fn broadcast_delivers_identical_payload_to_all() {
        let store = Arc::new(StateStore::new());
        let hub = BroadcastHub::new(store.clone());

        let a = FakeSubscriber::new(false);
        let b = FakeSubscriber::new(false);
        hub.register(a.clone()).await;
        hub.register(b.clone()).await;

        apply_spot(&store, 2401.0);
        hub.broadcast().await;

        let last_a = a.received().pop().unwrap();
        let last_b = b.received().pop().unwrap();
        assert_eq!(last_a, last_b);
        assert!(last_a.contains("\"version\":1"));
    }

    #[tokio::test]
    async fn failed_push_prunes_only_the_dead_subscriber() {
        let store = Arc::new(StateStore::new());
        let hub = BroadcastHub::new(store.clone());

        let alive = FakeSubscriber::new(false);
        hub.register(alive.clone()).await;
        // Register a healthy subscriber so the catch-up push succeeds, then
        // swap in a failing one under the same id for the broadcast pass.
        let dead_id = hub.register(FakeSubscriber::new(false)).await;
        assert_eq!(hub.subscriber_count().await, 2);

        hub.subscribers
            .lock()
            .await
            .insert(dead_id, FakeSubscriber::new(true));

        apply_spot(&store, 2402.0);
        hub.broadcast().await;

        assert_eq!(hub.subscriber_count().await, 1);
        assert_eq!(alive.received().len(), 2);
    }

    #[tokio::test]
    async fn failing_catch_up_push_unregisters_immediately() {
        let store = Arc::new(StateStore::new());
        let hub = BroadcastHub::new(store);

        hub.register(FakeSubscriber::new(true)).await;
        assert_eq!(hub.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let store = Arc::new(StateStore::new());
        let hub = BroadcastHub::new(store);

        let id = hub.register(FakeSubscriber::new(false)).await;
        hub.unregister(id).await;
        hub.unregister(id).await;
        assert_eq!(hub.subscriber_count().await, 0);
    }
}
