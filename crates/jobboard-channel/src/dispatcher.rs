//! Event subscription and single-flight dispatch.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{ChannelMessage, Inbound, Inbox, parse_message};

/// Something that reacts to one named channel event.
///
/// The dispatcher awaits `handle` to completion before it looks at the next
/// message, so invocations never overlap.
#[async_trait]
pub trait EventHandler: Send {
    async fn handle(&mut self, payload: Value);
}

/// Counters reported when a dispatch loop ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    /// Messages handed to at least one handler.
    pub dispatched: u64,
    /// Frames that could not be decoded.
    pub dropped: u64,
    /// Messages for event names nobody subscribed to.
    pub unhandled: u64,
}

/// Routes inbound messages to the handlers subscribed to their event name.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Vec<Box<dyn EventHandler>>>,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every message tagged `event`.
    ///
    /// Handlers for the same name run in registration order.
    pub fn subscribe(&mut self, event: impl Into<String>, handler: impl EventHandler + 'static) {
        let event = event.into();
        debug!(event = %event, "Handler subscribed");
        self.handlers
            .entry(event)
            .or_default()
            .push(Box::new(handler));
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Decode and dispatch one inbound message.
    pub async fn dispatch(&mut self, inbound: Inbound) {
        let message = match inbound {
            Inbound::Trigger(message) => message,
            Inbound::Frame(text) => match parse_message(&text) {
                Ok(message) => message,
                Err(e) => {
                    warn!(error = %e, frame = %text, "Dropping undecodable channel frame");
                    self.stats.dropped += 1;
                    return;
                }
            },
        };

        self.deliver(message).await;
    }

    async fn deliver(&mut self, message: ChannelMessage) {
        let Some(handlers) = self.handlers.get_mut(&message.event) else {
            debug!(event = %message.event, "No handler for channel event");
            self.stats.unhandled += 1;
            return;
        };

        for handler in handlers.iter_mut() {
            handler.handle(message.data.clone()).await;
        }
        self.stats.dispatched += 1;
    }

    /// Drain `inbox` until every sender is gone or `cancel` fires.
    pub async fn run(mut self, mut inbox: Inbox, cancel: CancellationToken) -> DispatchStats {
        info!(events = ?self.handlers.keys().collect::<Vec<_>>(), "Dispatcher started");

        loop {
            let inbound = tokio::select! {
                _ = cancel.cancelled() => break,
                inbound = inbox.recv() => match inbound {
                    Some(inbound) => inbound,
                    None => break,
                },
            };
            self.dispatch(inbound).await;
        }

        info!(
            dispatched = self.stats.dispatched,
            dropped = self.stats.dropped,
            unhandled = self.stats.unhandled,
            "Dispatcher stopped"
        );
        self.stats
    }
}
