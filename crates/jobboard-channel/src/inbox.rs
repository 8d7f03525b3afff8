//! The single FIFO queue every inbound message passes through.

use serde_json::Value;
use tokio::sync::mpsc;

use crate::{ChannelError, ChannelMessage};

/// A message waiting to be dispatched.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A raw text frame from the push channel, not yet decoded.
    Frame(String),
    /// A locally triggered, already decoded message.
    Trigger(ChannelMessage),
}

/// Sending side of the inbox. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    tx: mpsc::Sender<Inbound>,
}

/// Receiving side of the inbox, owned by the dispatcher.
#[derive(Debug)]
pub struct Inbox {
    rx: mpsc::Receiver<Inbound>,
}

/// Create an inbox holding at most `capacity` undispatched messages.
///
/// Senders wait when the inbox is full, so a slow dispatcher applies
/// backpressure to the push connection instead of dropping updates.
pub fn inbox(capacity: usize) -> (ChannelHandle, Inbox) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelHandle { tx }, Inbox { rx })
}

impl ChannelHandle {
    /// Queue a raw frame received from the push channel.
    pub async fn push_frame(&self, text: impl Into<String>) -> Result<(), ChannelError> {
        self.send(Inbound::Frame(text.into())).await
    }

    /// Queue an event as if it had arrived on the push channel.
    pub async fn trigger(&self, event: impl Into<String>, data: Value) -> Result<(), ChannelError> {
        self.send(Inbound::Trigger(ChannelMessage::new(event, data)))
            .await
    }

    /// Whether the dispatcher side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, inbound: Inbound) -> Result<(), ChannelError> {
        self.tx.send(inbound).await.map_err(|_| ChannelError::Closed)
    }
}

impl Inbox {
    /// Wait for the next message. `None` once every handle is dropped.
    pub async fn recv(&mut self) -> Option<Inbound> {
        self.rx.recv().await
    }
}
