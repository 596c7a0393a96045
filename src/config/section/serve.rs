//! `[serve]` section configuration.
//!
//! Contains the request-layer and live-update listener settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5278                 # HTTP port number
//! ws_port = 35730             # WebSocket port for live updates
//! verbose = false             # Show debug output
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the document reachable from the LAN.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// WebSocket port for the live-update channel.
    /// The next free port is used if this one is taken.
    pub ws_port: u16,

    /// Show debug output.
    pub verbose: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5278,
            ws_port: 35730,
            verbose: false,
        }
    }
}

impl ServeConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == self.ws_port {
            diag.error_with_hint(
                "serve.ws_port",
                format!("HTTP and WebSocket listeners both use port {}", self.port),
                "pick a different `ws_port`",
            );
        }
    }
}
