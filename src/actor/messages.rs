//! Actor Message Definitions
//!
//! Message types for inter-actor communication.
//!
//! ```text
//! FsActor --Reconcile--> ReconcilerActor <--Get/Save-- request handlers
//! ```

use tokio::sync::oneshot;

pub use super::fs::ChangeSource;

// =============================================================================
// ReconcilerActor Messages
// =============================================================================

/// Messages to the Reconciler Actor
#[derive(Debug)]
pub enum ReconcileMsg {
    /// Read the current document
    Get { reply: oneshot::Sender<String> },
    /// Writer-initiated save
    Save {
        content: String,
        reply: oneshot::Sender<SaveOutcome>,
    },
    /// Debounced "the backing file may have changed"
    Reconcile { source: ChangeSource },
    /// Stop the actor
    Shutdown,
}

/// Result of a writer-initiated save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Identical to the current value; nothing persisted or broadcast
    Unchanged,
    /// Accepted into memory and broadcast; persist issued in the background
    Accepted { generation: u64 },
}

impl SaveOutcome {
    pub fn changed(self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Result of comparing a fresh disk read against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Echo of our own last write
    SelfWrite,
    /// Already reflected in memory
    Unchanged,
    /// Genuine external edit, adopted and broadcast
    Adopted,
}
