//! WebSocket Server for Live Updates
//!
//! Accepts reader connections and hands each one to its own client thread,
//! which subscribes to the [`Broadcaster`].

use std::net::{IpAddr, SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::actor::ws::{Broadcaster, serve_client};
use crate::core::is_shutdown;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Acceptor idle sleep when no connection is pending
const ACCEPT_IDLE: Duration = Duration::from_millis(100);

/// Start the WebSocket server. Returns the port actually bound.
pub fn start_ws_server(
    interface: IpAddr,
    base_port: u16,
    broadcaster: Arc<Broadcaster>,
) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::Builder::new()
        .name("ws-accept".into())
        .spawn(move || accept_loop(listener, broadcaster))?;

    Ok(actual_port)
}

fn accept_loop(listener: TcpListener, broadcaster: Arc<Broadcaster>) {
    while !is_shutdown() {
        match listener.accept() {
            Ok((stream, addr)) => {
                crate::debug!("ws"; "client connected: {}", addr);

                // Set blocking for WebSocket operations
                let _ = stream.set_nonblocking(false);

                let broadcaster = Arc::clone(&broadcaster);
                let spawned = std::thread::Builder::new()
                    .name(format!("ws-{addr}"))
                    .spawn(move || serve_client(stream, broadcaster));
                if let Err(e) = spawned {
                    crate::log!("ws"; "failed to spawn client thread: {}", e);
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_IDLE);
            }
            Err(e) => {
                crate::log!("ws"; "accept error: {}", e);
                std::thread::sleep(ACCEPT_IDLE);
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
