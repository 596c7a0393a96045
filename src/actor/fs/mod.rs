//! FileSystem Actor
//!
//! Watches the backing file for changes made outside this process and sends
//! debounced reconciliation requests to the ReconcilerActor.
//! Implements the "Watcher-First" pattern: watchers and the poll baseline are
//! set up before the document is loaded, so no edit falls into a gap.
//!
//! Architecture:
//! ```text
//! stat poll ────────┐
//! file watch ───────┼→ Debouncer (pure timing) → ReconcileMsg::Reconcile
//! directory watch ──┘
//! ```
//!
//! Detection channels only enqueue; they never touch document state.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::messages::ReconcileMsg;
use crate::config::WatchConfig;

// Pure timing and coalescing.
mod debouncer;
// Stat comparison fallback.
mod poll;
// Shared fs event types.
mod types;
// Native watch attach/re-attach lifecycle.
mod watch_targets;

#[cfg(test)]
mod tests;

pub use types::ChangeSource;

use debouncer::Debouncer;
use poll::StatPoller;
use types::TaggedEvent;
use watch_targets::{WatchTargets, classify};

/// FileSystem Actor - detects changes to the backing file
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<TaggedEvent>,
    /// Native watchers (must be kept alive)
    targets: WatchTargets,
    poller: StatPoller,
    poll_interval: Duration,
    debouncer: Debouncer,
    /// Document file name, for filtering directory events
    file_name: OsString,
    /// Channel to send messages to ReconcilerActor
    reconcile_tx: mpsc::Sender<ReconcileMsg>,
}

impl FsActor {
    /// Create a new FsActor with Watcher-First pattern.
    ///
    /// Never fails: unavailable native channels are logged and skipped.
    pub fn new(path: PathBuf, watch: &WatchConfig, reconcile_tx: mpsc::Sender<ReconcileMsg>) -> Self {
        // Create sync channel for notify (it doesn't support async)
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let targets = if watch.native {
            WatchTargets::attach(path.clone(), &notify_tx)
        } else {
            WatchTargets::disabled(path.clone())
        };
        if !targets.is_native_active() {
            crate::log!("watch"; "native watch inactive, polling every {:?}", watch.poll_interval());
        }

        Self {
            notify_rx,
            targets,
            file_name: path.file_name().map(OsString::from).unwrap_or_default(),
            poller: StatPoller::new(path),
            poll_interval: watch.poll_interval(),
            debouncer: Debouncer::new(watch.debounce()),
            reconcile_tx,
        }
    }

    /// Run the actor event loop until the ReconcilerActor goes away.
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut targets,
            mut poller,
            poll_interval,
            mut debouncer,
            file_name,
            reconcile_tx,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<(ChangeSource, notify::Event)>(64);

        // Spawn a thread to poll notify events and send to async channel
        std::thread::spawn(move || {
            while let Ok((source, result)) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send((source, event)).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "{} notify error: {}", source.label(), e),
                }
            }
        });

        let mut poll = tokio::time::interval(poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                Some((source, event)) = async_rx.recv() => {
                    if let Some(relevant) = classify(source, &event, &file_name) {
                        if relevant.reattach {
                            targets.mark_stale();
                        }
                        debouncer.add(source, Instant::now());
                    }
                }
                _ = poll.tick() => {
                    // Ensure native watches remain attached.
                    targets.maintain();
                    if poller.check() {
                        debouncer.add(ChangeSource::Poll, Instant::now());
                    }
                }
                _ = tokio::time::sleep(debouncer.sleep_duration(Instant::now())) => {
                    let Some((source, hits)) = debouncer.take_if_ready(Instant::now()) else {
                        continue;
                    };
                    crate::debug!("watch"; "reconcile via {} ({} signals)", source.label(), hits);
                    if reconcile_tx.send(ReconcileMsg::Reconcile { source }).await.is_err() {
                        break;
                    }
                }
            }
        }

        crate::debug!("watch"; "stopped");
    }
}
