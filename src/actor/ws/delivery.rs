use std::sync::Arc;

use super::Broadcaster;

impl Broadcaster {
    /// Deliver `content` to every registered subscriber.
    ///
    /// Subscribers whose outbox is closed are removed in the same pass.
    /// Returns the number of subscribers the value was delivered to.
    pub fn publish(&self, content: &str) -> usize {
        let value: Arc<str> = Arc::from(content);
        let mut registry = self.registry.lock();
        registry.latest = Arc::clone(&value);

        let before = registry.subscribers.len();
        registry.subscribers.retain(|id, tx| match tx.send(Arc::clone(&value)) {
            Ok(()) => true,
            Err(_) => {
                crate::debug!("ws"; "subscriber {} disconnected", id);
                false
            }
        });
        let delivered = registry.subscribers.len();
        drop(registry);

        if before == 0 {
            crate::debug!("ws"; "no subscribers connected");
        } else {
            crate::debug!("ws"; "broadcast {} bytes to {} subscribers", content.len(), delivered);
        }
        delivered
    }
}
