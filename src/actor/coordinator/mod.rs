//! Actor Coordinator - Wires up the Sync Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Starts the watcher before the document is loaded (Watcher-First)
//! - Loads the document and seeds the store and broadcaster
//! - Runs the actors until shutdown

mod runtime;

use std::sync::Arc;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::ReconcileMsg;
use super::reconciler::{Reconciler, ReconcilerActor, ReconcilerHandle};
use super::ws::Broadcaster;
use crate::config::SyncConfig;
use crate::document::{ContentStore, Persistence};

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up the actor system.
pub struct Coordinator {
    config: Arc<SyncConfig>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    /// Create from Arc<SyncConfig>.
    pub fn with_config(config: Arc<SyncConfig>) -> Self {
        Self {
            config,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Build the actors without running them.
    ///
    /// The returned handle and broadcaster are usable right away; requests
    /// queue until [`SyncEngine::run`] starts.
    pub fn build(self) -> SyncEngine {
        let path = self.config.document_path().to_path_buf();
        let watch = &self.config.watch;
        let (reconcile_tx, reconcile_rx) = mpsc::channel::<ReconcileMsg>(CHANNEL_BUFFER);

        let fs = FsActor::new(path.clone(), watch, reconcile_tx.clone());

        let persistence = Persistence::new(path, watch.persist_timeout());
        let content = persistence.load();
        crate::debug!("sync"; "loaded {} ({} bytes)", persistence.path().display(), content.len());

        let broadcaster = Broadcaster::new(&content);
        let core = Reconciler::new(ContentStore::new(content), Arc::clone(&broadcaster));
        let reconciler = ReconcilerActor::new(reconcile_rx, core, persistence);

        SyncEngine {
            fs,
            reconciler,
            handle: ReconcilerHandle::new(reconcile_tx),
            broadcaster,
            shutdown_rx: self.shutdown_rx,
        }
    }
}

/// Fully wired actor system, ready to run.
pub struct SyncEngine {
    fs: FsActor,
    reconciler: ReconcilerActor,
    handle: ReconcilerHandle,
    broadcaster: Arc<Broadcaster>,
    shutdown_rx: Option<Receiver<()>>,
}

impl SyncEngine {
    pub fn handle(&self) -> ReconcilerHandle {
        self.handle.clone()
    }

    pub fn broadcaster(&self) -> Arc<Broadcaster> {
        Arc::clone(&self.broadcaster)
    }

    /// Run the actor system until shutdown.
    pub async fn run(self) {
        crate::debug!("actor"; "start");
        runtime::run_actors(self.fs, self.reconciler, self.handle, self.shutdown_rx).await;
        crate::debug!("actor"; "stopped");
    }
}
