//! Actor System for Document Sync
//!
//! Message-passing concurrency around a single document owner:
//!
//! ```text
//! FsActor ──Reconcile──▶ ReconcilerActor ──publish──▶ Broadcaster ──▶ readers
//! (watch)                (owns document)   (fan-out)
//!                              ▲
//!                request handlers (Get / Save)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - Change detection with debouncing
//! - `reconciler` - Document owner, self-write suppression
//! - `ws` - Subscriber registry and broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod reconciler;
pub mod ws;

pub use coordinator::{Coordinator, SyncEngine};
pub use reconciler::ReconcilerHandle;
