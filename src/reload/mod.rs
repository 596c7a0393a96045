//! Live-update channel.
//!
//! Readers connect over WebSocket and receive the document every time it
//! changes:
//!
//! ```text
//! Reconciler --publish--> Broadcaster --outbox--> client thread --> Browser
//! ```
//!
//! # Modules
//!
//! - `message` - Wire format of pushed events
//! - `server` - WebSocket acceptor with port retry

pub mod message;
pub mod server;

pub use server::start_ws_server;
