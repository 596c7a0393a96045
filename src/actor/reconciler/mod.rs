//! Reconciler Actor
//!
//! Single owner of the document. Writers and the watcher reach it only
//! through [`ReconcileMsg`], so a save and a reconciliation can never
//! interleave. Disk I/O runs as background tasks that report back over an
//! internal channel; the actor itself never waits on the filesystem.
//!
//! ```text
//! handlers --Get/Save--┐                      ┌--publish--> Broadcaster
//!                      ├--> ReconcilerActor --┤
//! FsActor --Reconcile--┘         ^            └--spawn--> read / persist
//!                                └---------IoEvent-----------┘
//! ```

mod state;


pub use state::Reconciler;

use anyhow::{Context, Result, anyhow};
use tokio::sync::{mpsc, oneshot};

use super::messages::{ChangeSource, ReconcileMsg, ReconcileOutcome, SaveOutcome};
use crate::document::{PersistError, Persistence};

/// Completed background I/O
enum IoEvent {
    DiskRead {
        content: String,
        /// Store generation when the read was issued
        generation: u64,
        source: ChangeSource,
    },
    Persisted {
        result: Result<(), PersistError>,
    },
}

/// Reconciler Actor - serializes every mutation of the document
pub struct ReconcilerActor {
    rx: mpsc::Receiver<ReconcileMsg>,
    core: Reconciler,
    persistence: Persistence,
    io_tx: mpsc::UnboundedSender<IoEvent>,
    io_rx: mpsc::UnboundedReceiver<IoEvent>,
    /// A disk read is outstanding
    reading: bool,
    /// Reconciliation deferred until I/O settles (coalesced)
    recheck: Option<ChangeSource>,
}

impl ReconcilerActor {
    pub fn new(rx: mpsc::Receiver<ReconcileMsg>, core: Reconciler, persistence: Persistence) -> Self {
        let (io_tx, io_rx) = mpsc::unbounded_channel();
        Self {
            rx,
            core,
            persistence,
            io_tx,
            io_rx,
            reading: false,
            recheck: None,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                Some(event) = self.io_rx.recv() => self.handle_io(event),
                msg = self.rx.recv() => match msg {
                    Some(ReconcileMsg::Shutdown) | None => break,
                    Some(msg) => self.handle(msg),
                },
            }
        }

        self.flush().await;
        crate::debug!("sync"; "stopped");
    }

    fn handle(&mut self, msg: ReconcileMsg) {
        match msg {
            ReconcileMsg::Get { reply } => {
                let _ = reply.send(self.core.get().to_owned());
            }
            ReconcileMsg::Save { content, reply } => {
                let outcome = self.core.save(content);
                let _ = reply.send(outcome);
                if let SaveOutcome::Accepted { generation } = outcome {
                    crate::debug!("sync"; "save accepted (generation {}, {} bytes)", generation, self.core.get().len());
                    self.start_persist();
                }
            }
            ReconcileMsg::Reconcile { source } => self.request_read(source),
            // Handled by the run loop
            ReconcileMsg::Shutdown => {}
        }
    }

    fn handle_io(&mut self, event: IoEvent) {
        match event {
            IoEvent::DiskRead {
                content,
                generation,
                source,
            } => {
                self.reading = false;
                if generation != self.core.generation() || self.core.is_persisting() {
                    // Raced with a save: the read may predate our own write
                    crate::debug!("sync"; "discarding stale read via {}", source.label());
                    self.recheck.get_or_insert(source);
                } else {
                    self.apply(content, source);
                }
            }
            IoEvent::Persisted { result } => {
                self.core.persist_settled();
                if let Err(e) = result {
                    crate::log!("persist"; "{}", e);
                    crate::logger::status_error("write failed, content kept in memory", &error_chain(&e));
                }
                self.start_persist();
            }
        }
        self.run_recheck();
    }

    fn apply(&mut self, content: String, source: ChangeSource) {
        let len = content.len();
        match self.core.apply_disk(content) {
            ReconcileOutcome::Adopted => {
                crate::logger::status_success(&format!(
                    "external edit adopted via {} ({} bytes)",
                    source.label(),
                    len
                ));
            }
            ReconcileOutcome::SelfWrite => {
                crate::debug!("sync"; "self-write echo via {} suppressed", source.label());
            }
            ReconcileOutcome::Unchanged => {
                crate::debug!("sync"; "no change via {}", source.label());
            }
        }
    }

    /// Issue a background read, or defer it while I/O is outstanding.
    fn request_read(&mut self, source: ChangeSource) {
        if self.reading || self.core.is_persisting() {
            crate::debug!("sync"; "reconcile via {} deferred", source.label());
            self.recheck.get_or_insert(source);
            return;
        }

        self.reading = true;
        let persistence = self.persistence.clone();
        let generation = self.core.generation();
        let io_tx = self.io_tx.clone();
        tokio::spawn(async move {
            let content = persistence.load_async().await;
            let _ = io_tx.send(IoEvent::DiskRead {
                content,
                generation,
                source,
            });
        });
    }

    fn run_recheck(&mut self) {
        if self.reading || self.core.is_persisting() {
            return;
        }
        if let Some(source) = self.recheck.take() {
            self.request_read(source);
        }
    }

    fn start_persist(&mut self) {
        let Some(content) = self.core.begin_persist() else {
            return;
        };
        let persistence = self.persistence.clone();
        let io_tx = self.io_tx.clone();
        tokio::spawn(async move {
            let result = persistence.save(content).await;
            let _ = io_tx.send(IoEvent::Persisted { result });
        });
    }

    /// Let owed writes land before stopping. The caller bounds the wait.
    async fn flush(&mut self) {
        while self.core.is_persisting() {
            self.start_persist();
            match self.io_rx.recv().await {
                Some(IoEvent::Persisted { result }) => {
                    self.core.persist_settled();
                    if let Err(e) = result {
                        crate::log!("persist"; "{}", e);
                    }
                }
                Some(IoEvent::DiskRead { .. }) => {}
                None => break,
            }
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut detail = String::new();
    let mut source = err.source();
    while let Some(cause) = source {
        if !detail.is_empty() {
            detail.push('\n');
        }
        detail.push_str(&format!("  {cause}"));
        source = cause.source();
    }
    detail
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable entry point used by request handlers and the watcher.
#[derive(Clone)]
pub struct ReconcilerHandle {
    tx: mpsc::Sender<ReconcileMsg>,
}

impl ReconcilerHandle {
    pub fn new(tx: mpsc::Sender<ReconcileMsg>) -> Self {
        Self { tx }
    }

    /// Sender for producers that speak the message protocol directly.
    #[cfg(test)]
    pub fn sender(&self) -> mpsc::Sender<ReconcileMsg> {
        self.tx.clone()
    }

    /// Current document (from a non-async thread).
    pub fn get_blocking(&self) -> Result<String> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .blocking_send(ReconcileMsg::Get { reply })
            .map_err(|_| anyhow!("reconciler stopped"))?;
        rx.blocking_recv().context("reconciler dropped request")
    }

    /// Submit a save (from a non-async thread).
    pub fn save_blocking(&self, content: String) -> Result<SaveOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .blocking_send(ReconcileMsg::Save { content, reply })
            .map_err(|_| anyhow!("reconciler stopped"))?;
        rx.blocking_recv().context("reconciler dropped request")
    }

    #[cfg(test)]
    pub async fn get(&self) -> Result<String> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ReconcileMsg::Get { reply })
            .await
            .map_err(|_| anyhow!("reconciler stopped"))?;
        rx.await.context("reconciler dropped request")
    }

    #[cfg(test)]
    pub async fn save(&self, content: String) -> Result<SaveOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ReconcileMsg::Save { content, reply })
            .await
            .map_err(|_| anyhow!("reconciler stopped"))?;
        rx.await.context("reconciler dropped request")
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(ReconcileMsg::Shutdown).await;
    }
}
