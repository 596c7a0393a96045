use std::time::Duration;

use crossbeam::channel::Receiver;

use crate::actor::fs::FsActor;
use crate::actor::reconciler::{ReconcilerActor, ReconcilerHandle};

/// Bound on waiting for the reconciler to flush after shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(3);

/// Run all actors concurrently.
pub(super) async fn run_actors(
    fs: FsActor,
    reconciler: ReconcilerActor,
    handle: ReconcilerHandle,
    shutdown_rx: Option<Receiver<()>>,
) {
    let reconciler_handle = tokio::spawn(reconciler.run());
    let fs_handle = tokio::spawn(fs.run());

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            if reconciler_handle.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        // Runs until someone sends `Shutdown` through a handle
        let _ = reconciler_handle.await;
        fs_handle.abort();
        return;
    }

    fs_handle.abort();

    crate::debug!("actor"; "sending shutdown to reconciler");
    handle.shutdown().await;
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, reconciler_handle).await;
}
