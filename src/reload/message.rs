//! Live-update Message Protocol
//!
//! JSON events pushed to connected readers:
//!
//! ```json
//! {"event": "content", "data": {"content": "..."}}
//! ```

use serde::{Deserialize, Serialize};

/// Event pushed over the live-update channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum SyncMessage {
    /// Full document value (sent on connect and on every change)
    Content {
        content: String,
    },
}

impl SyncMessage {
    pub fn content(content: impl Into<String>) -> Self {
        Self::Content {
            content: content.into(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Deserialize from JSON string
    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
