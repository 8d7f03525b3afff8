//! Channel errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    /// Failed to establish the WebSocket connection.
    #[error("connection error: {0}")]
    Connection(String),

    /// A protocol-level error on an established connection.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The inbox receiver is gone; nothing will consume further messages.
    #[error("channel inbox closed")]
    Closed,
}
