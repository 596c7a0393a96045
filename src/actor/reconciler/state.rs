use std::sync::Arc;

use crate::actor::messages::{ReconcileOutcome, SaveOutcome};
use crate::actor::ws::Broadcaster;
use crate::document::ContentStore;

/// Decision logic of the reconciler, free of I/O and channels.
///
/// Owns the [`ContentStore`] and tracks persistence progress:
/// - `generation` bumps on every accepted save, so a disk read that started
///   before a save can be recognized as stale
/// - at most one persist is in flight; later saves mark the store `dirty`
///   and are written once it settles (only the newest value is written)
pub struct Reconciler {
    store: ContentStore,
    broadcaster: Arc<Broadcaster>,
    generation: u64,
    writing: bool,
    dirty: bool,
}

impl Reconciler {
    pub fn new(store: ContentStore, broadcaster: Arc<Broadcaster>) -> Self {
        Self {
            store,
            broadcaster,
            generation: 0,
            writing: false,
            dirty: false,
        }
    }

    pub fn get(&self) -> &str {
        self.store.get()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the file may still lag behind memory because of our own write.
    pub fn is_persisting(&self) -> bool {
        self.writing || self.dirty
    }

    /// Writer-initiated save.
    ///
    /// The snapshot is recorded before the persist is even scheduled, so the
    /// watcher's echo of this write is always recognized.
    pub fn save(&mut self, content: String) -> SaveOutcome {
        if !self.store.set(content) {
            return SaveOutcome::Unchanged;
        }

        self.store.mark_persisted(self.store.get().to_owned());
        self.generation += 1;
        self.dirty = true;
        self.broadcaster.publish(self.store.get());

        SaveOutcome::Accepted {
            generation: self.generation,
        }
    }

    /// Value to write next, if a write is owed and none is running.
    pub fn begin_persist(&mut self) -> Option<String> {
        if self.writing || !self.dirty {
            return None;
        }
        self.writing = true;
        self.dirty = false;
        Some(self.store.last_persisted().to_owned())
    }

    /// The running write finished (successfully or not).
    pub fn persist_settled(&mut self) {
        self.writing = false;
    }

    /// Compare a fresh read of the backing file against the store.
    pub fn apply_disk(&mut self, on_disk: String) -> ReconcileOutcome {
        if self.store.is_self_write(&on_disk) {
            return ReconcileOutcome::SelfWrite;
        }
        if on_disk == self.store.get() {
            return ReconcileOutcome::Unchanged;
        }

        self.store.set(on_disk);
        // Adopted value is the on-disk truth
        self.store.mark_persisted(self.store.get().to_owned());
        self.broadcaster.publish(self.store.get());
        ReconcileOutcome::Adopted
    }
}
