//! Push channel plumbing for jobboard.
//!
//! Every inbound message, whether a WebSocket frame or a legacy relay
//! call, lands in one FIFO [`Inbox`]. A single [`Dispatcher`] drains it and
//! runs the handlers subscribed to each event name, one message at a time.

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod inbox;
pub mod message;
pub mod reconnect;
pub mod relay;

pub use client::{PushClient, PushConnection};
pub use dispatcher::{DispatchStats, Dispatcher, EventHandler};
pub use error::ChannelError;
pub use inbox::{ChannelHandle, Inbound, Inbox, inbox};
pub use message::{ChannelMessage, parse_message};
pub use reconnect::maintain_connection;
pub use relay::LegacyRelay;
