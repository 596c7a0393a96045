//! Subscriber Registry / Broadcaster
//!
//! Holds every connected reader and fans document changes out to them:
//!
//! ```text
//! Reconciler --publish--> Broadcaster --[outbox per subscriber]--> client threads
//! ```
//!
//! Each subscriber owns an unbounded outbox, so publishing never blocks on a
//! slow reader. A subscriber whose outbox is gone (client thread exited) is
//! dropped from the registry during the next publish.

mod client_io;
mod delivery;

pub use client_io::serve_client;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Opaque subscriber identifier
pub type SubscriberId = u64;

/// Registry state, guarded by a single lock so that subscribe and publish
/// are totally ordered.
struct Registry {
    /// Value most recently published (the snapshot new subscribers receive)
    latest: Arc<str>,
    subscribers: FxHashMap<SubscriberId, Sender<Arc<str>>>,
}

/// Fan-out of document changes to live subscribers
pub struct Broadcaster {
    registry: Mutex<Registry>,
    next_id: AtomicU64,
}

impl Broadcaster {
    /// Create a broadcaster whose initial snapshot is `initial`.
    pub fn new(initial: &str) -> Arc<Self> {
        Arc::new(Self {
            registry: Mutex::new(Registry {
                latest: Arc::from(initial),
                subscribers: FxHashMap::default(),
            }),
            next_id: AtomicU64::new(1),
        })
    }

    /// Register a subscriber.
    ///
    /// The current snapshot is queued before the lock is released, so no
    /// publish can slip in between registration and the first message.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = channel::unbounded();

        let mut registry = self.registry.lock();
        // Receiver is alive in this scope
        let _ = tx.send(Arc::clone(&registry.latest));
        registry.subscribers.insert(id, tx);
        let total = registry.subscribers.len();
        drop(registry);

        crate::debug!("ws"; "subscriber {} joined (total: {})", id, total);
        Subscription {
            id,
            rx,
            owner: Arc::clone(self),
        }
    }

    /// Remove a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let removed = self.registry.lock().subscribers.remove(&id).is_some();
        if removed {
            crate::debug!("ws"; "subscriber {} left", id);
        }
    }

    /// Number of registered subscribers
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.registry.lock().subscribers.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot a new subscriber would receive right now
    #[cfg(test)]
    pub fn latest(&self) -> Arc<str> {
        Arc::clone(&self.registry.lock().latest)
    }
}

/// A live registration. Dropping it unsubscribes.
pub struct Subscription {
    id: SubscriberId,
    rx: Receiver<Arc<str>>,
    owner: Arc<Broadcaster>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    #[cfg(test)]
    pub fn try_recv(&self) -> Result<Arc<str>, channel::TryRecvError> {
        self.rx.try_recv()
    }

    /// Drain every value already queued.
    pub fn drain(&self) -> Vec<Arc<str>> {
        self.rx.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.owner.unsubscribe(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_receives_snapshot_first() {
        let broadcaster = Broadcaster::new("initial");
        let sub = broadcaster.subscribe();

        assert_eq!(&*sub.try_recv().unwrap(), "initial");
        assert!(sub.try_recv().is_err());
        assert_eq!(broadcaster.len(), 1);
    }

    #[test]
    fn test_late_subscriber_sees_latest_publish() {
        let broadcaster = Broadcaster::new("");
        broadcaster.publish("hello");
        broadcaster.publish("world");

        let sub = broadcaster.subscribe();
        assert_eq!(sub.drain(), vec![Arc::<str>::from("world")]);
    }

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let broadcaster = Broadcaster::new("");
        let a = broadcaster.subscribe();
        let b = broadcaster.subscribe();
        a.drain();
        b.drain();

        assert_eq!(broadcaster.publish("x"), 2);
        assert_eq!(&*a.try_recv().unwrap(), "x");
        assert_eq!(&*b.try_recv().unwrap(), "x");
    }

    #[test]
    fn test_drop_unsubscribes() {
        let broadcaster = Broadcaster::new("");
        let sub = broadcaster.subscribe();
        let other = broadcaster.subscribe();
        assert_eq!(broadcaster.len(), 2);

        drop(sub);
        assert_eq!(broadcaster.len(), 1);

        broadcaster.unsubscribe(other.id());
        assert!(broadcaster.is_empty());
        // dropping after explicit unsubscribe is harmless
        drop(other);
        assert!(broadcaster.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let broadcaster = Broadcaster::new("");
        let a = broadcaster.subscribe();
        let b = broadcaster.subscribe();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_concurrent_subscribe_never_misses_update() {
        let broadcaster = Broadcaster::new("0");
        let publisher = {
            let broadcaster = Arc::clone(&broadcaster);
            std::thread::spawn(move || {
                for i in 1..=200 {
                    broadcaster.publish(&i.to_string());
                }
            })
        };

        let subs: Vec<_> = (0..20).map(|_| broadcaster.subscribe()).collect();
        publisher.join().unwrap();

        for sub in subs {
            let seen: Vec<u32> = sub.drain().iter().map(|s| s.parse().unwrap()).collect();
            // snapshot first, then a gapless tail ending at the final value
            assert_eq!(*seen.last().unwrap(), 200);
            assert!(seen.windows(2).all(|w| w[1] == w[0] + 1));
        }
    }
}
