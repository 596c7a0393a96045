use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::{Broadcaster, Subscription};
use crate::core::is_shutdown;
use crate::reload::message::SyncMessage;

/// Upper bound on a stalled handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Read poll interval; also bounds push latency to this client
const READ_POLL: Duration = Duration::from_millis(25);

/// Serve one reader until it disconnects or the process shuts down.
///
/// Runs on the client's own thread: a slow reader only ever stalls itself.
pub fn serve_client(stream: TcpStream, broadcaster: Arc<Broadcaster>) {
    let _ = stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT));
    let mut ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(e) => {
            crate::log!("ws"; "handshake failed: {}", e);
            return;
        }
    };

    // Short read timeout turns `read` into a poll that yields to the outbox
    let _ = ws.get_ref().set_read_timeout(Some(READ_POLL));

    let subscription = broadcaster.subscribe();
    match pump(&mut ws, &subscription) {
        Ok(()) => {
            let _ = ws.close(None);
            let _ = ws.flush();
        }
        Err(e) => crate::debug!("ws"; "subscriber {} dropped: {}", subscription.id(), e),
    }
    // `subscription` drops here and unsubscribes
}

/// Forward published values and watch for the client going away.
///
/// Returns `Ok` on a clean close (either side), `Err` on I/O failure.
fn pump(ws: &mut WebSocket<TcpStream>, subscription: &Subscription) -> tungstenite::Result<()> {
    loop {
        if is_shutdown() {
            return Ok(());
        }

        for content in subscription.drain() {
            let msg = SyncMessage::content(&*content);
            ws.send(Message::Text(msg.to_json().into()))?;
        }

        match ws.read() {
            Ok(Message::Close(_)) => return Ok(()),
            // Readers are passive; anything else they send is ignored
            Ok(_) => {}
            Err(tungstenite::Error::Io(ref e)) if is_poll_timeout(e.kind()) => {
                // Flush any queued pong
                ws.flush()?;
            }
            Err(tungstenite::Error::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e),
        }
    }
}

fn is_poll_timeout(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
