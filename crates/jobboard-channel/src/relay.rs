//! Legacy relay for callers that still push job updates directly.

use serde_json::Value;
use tracing::debug;

use crate::{ChannelError, ChannelHandle};

/// Re-publishes externally supplied job payloads onto the push channel
/// path, under the same event name native updates use.
#[derive(Debug, Clone)]
pub struct LegacyRelay {
    handle: ChannelHandle,
    event: String,
}

impl LegacyRelay {
    pub fn new(handle: ChannelHandle, event: impl Into<String>) -> Self {
        Self {
            handle,
            event: event.into(),
        }
    }

    /// Event name relayed payloads are tagged with.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Relay one job payload. It is dispatched exactly like a channel
    /// message carrying the same payload.
    pub async fn jobupdate(&self, payload: Value) -> Result<(), ChannelError> {
        debug!(event = %self.event, "Relaying legacy job update");
        self.handle.trigger(self.event.clone(), payload).await
    }
}
