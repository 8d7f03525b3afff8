//! WebSocket client for the push channel.
//!
//! [`PushClient`] holds the endpoint. Call [`PushClient::connect`] to open a
//! live [`PushConnection`], then [`PushConnection::forward`] to feed its
//! text frames into the inbox.

use futures::StreamExt;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::{ChannelError, ChannelHandle};

/// Configuration handle for one push channel endpoint.
#[derive(Debug, Clone)]
pub struct PushClient {
    url: Url,
}

/// A live WebSocket connection to the push channel.
pub struct PushConnection {
    url: Url,
    ws_stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

/// Why [`PushConnection::forward`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The server closed the connection.
    Closed,
    /// Shutdown was requested.
    Cancelled,
}

impl PushClient {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Open the WebSocket connection.
    pub async fn connect(&self) -> Result<PushConnection, ChannelError> {
        let (ws_stream, _response) = connect_async(self.url.as_str()).await.map_err(|e| {
            ChannelError::Connection(format!("Failed to connect to {}: {e}", self.url))
        })?;

        info!(url = %self.url, "Connected to push channel");

        Ok(PushConnection {
            url: self.url.clone(),
            ws_stream,
        })
    }
}

impl PushConnection {
    /// Forward every text frame into the inbox, in arrival order, until the
    /// server closes the connection or `cancel` fires.
    ///
    /// Binary and control frames are skipped. Fails with
    /// [`ChannelError::Closed`] when the inbox is gone.
    pub async fn forward(
        mut self,
        handle: &ChannelHandle,
        cancel: &CancellationToken,
    ) -> Result<StreamEnd, ChannelError> {
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => None,
                msg = self.ws_stream.next() => Some(msg),
            };
            let Some(msg) = next else {
                let _ = self.ws_stream.close(None).await;
                return Ok(StreamEnd::Cancelled);
            };

            match msg {
                Some(Ok(Message::Text(text))) => {
                    handle.push_frame(text.to_string()).await?;
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(url = %self.url, ?frame, "Push channel closed by server");
                    return Ok(StreamEnd::Closed);
                }
                Some(Ok(other)) => {
                    debug!(url = %self.url, kind = message_kind(&other), "Ignoring non-text frame");
                }
                Some(Err(e)) => {
                    return Err(ChannelError::Protocol(e.to_string()));
                }
                None => return Ok(StreamEnd::Closed),
            }
        }
    }
}

fn message_kind(msg: &Message) -> &'static str {
    match msg {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame",
    }
}
