//! The shared document: in-memory Content Store and its persistence.
//!
//! - [`ContentStore`] holds the current text and the snapshot this process
//!   last wrote to disk (used to recognize our own writes echoing back).
//! - [`persist`] reads and writes the backing file.

pub mod persist;

pub use persist::{PersistError, Persistence};

/// In-memory document state.
///
/// Owned exclusively by the reconciler; nothing else mutates it.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    /// Most recently accepted value (from a writer or an adopted external edit)
    current: String,
    /// Value this process most recently wrote (or adopted as on-disk truth)
    last_persisted: String,
}

impl ContentStore {
    /// Create a store seeded from the backing file.
    ///
    /// The loaded value is the on-disk truth, so it doubles as the initial
    /// persisted snapshot.
    pub fn new(initial: String) -> Self {
        Self {
            last_persisted: initial.clone(),
            current: initial,
        }
    }

    pub fn get(&self) -> &str {
        &self.current
    }

    /// Replace the current value. Returns `false` (and leaves the store
    /// untouched) when `content` is identical to what is already held.
    pub fn set(&mut self, content: String) -> bool {
        if content == self.current {
            return false;
        }
        self.current = content;
        true
    }

    /// Record `snapshot` as the value most recently written to disk.
    pub fn mark_persisted(&mut self, snapshot: impl Into<String>) {
        self.last_persisted = snapshot.into();
    }

    pub fn last_persisted(&self) -> &str {
        &self.last_persisted
    }

    /// Whether `on_disk` is the echo of our own last write.
    pub fn is_self_write(&self, on_disk: &str) -> bool {
        on_disk == self.last_persisted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_seeds_snapshot() {
        let store = ContentStore::new("loaded".into());
        assert_eq!(store.get(), "loaded");
        assert_eq!(store.last_persisted(), "loaded");
        assert!(store.is_self_write("loaded"));
    }

    #[test]
    fn test_set_reports_change() {
        let mut store = ContentStore::default();
        assert!(store.set("hello".into()));
        assert_eq!(store.get(), "hello");
        assert!(!store.set("hello".into()));
        assert!(store.set(String::new()));
        assert_eq!(store.get(), "");
    }

    #[test]
    fn test_set_does_not_touch_snapshot() {
        let mut store = ContentStore::new("a".into());
        store.set("b".into());
        assert_eq!(store.last_persisted(), "a");
        assert!(!store.is_self_write("b"));

        store.mark_persisted("b");
        assert!(store.is_self_write("b"));
        assert!(!store.is_self_write("a"));
    }
}
