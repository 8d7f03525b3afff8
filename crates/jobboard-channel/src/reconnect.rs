//! Keeps the push channel connected, reconnecting with exponential
//! backoff whenever the connection drops.

use jobboard_config::ReconnectSettings;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::StreamEnd;
use crate::{ChannelError, ChannelHandle, PushClient};

/// Connect, forward frames into the inbox, and reconnect on failure until
/// `cancel` fires or the inbox is closed.
///
/// The backoff delay resets after every successful connection.
pub async fn maintain_connection(
    client: PushClient,
    handle: ChannelHandle,
    settings: ReconnectSettings,
    cancel: CancellationToken,
) {
    let mut delay = settings.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let connected = tokio::select! {
            _ = cancel.cancelled() => {
                info!(url = %client.url(), "Push client cancelled");
                return;
            }
            result = client.connect() => result,
        };

        match connected {
            Ok(connection) => {
                attempt = 0;
                delay = settings.initial_delay;

                match connection.forward(&handle, &cancel).await {
                    Ok(StreamEnd::Cancelled) => {
                        info!(url = %client.url(), "Push client cancelled");
                        return;
                    }
                    Ok(StreamEnd::Closed) => {
                        info!(url = %client.url(), "Push channel disconnected, reconnecting");
                    }
                    Err(ChannelError::Closed) => {
                        info!("Inbox closed, stopping push client");
                        return;
                    }
                    Err(e) => {
                        warn!(url = %client.url(), error = %e, "Push channel failed, reconnecting");
                    }
                }
            }
            Err(e) => {
                warn!(
                    url = %client.url(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Connect attempt failed"
                );
            }
        }

        // Wait before the next attempt, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }

        delay = settings.next_delay(delay);
    }
}
