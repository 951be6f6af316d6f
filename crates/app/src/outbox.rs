//! Outbox — in-process fan-out of outbound notices, backed by a tokio
//! broadcast channel.
//!
//! Transport adapters subscribe and deliver each [`OutboundMessage`] to its
//! recipient. [`OutboxBroadcaster`] is the [`Broadcaster`] the state machine
//! talks to: it expands one notice into one message per subscriber.

use std::sync::Arc;

use gdoormon_domain::error::GdoormonError;
use gdoormon_domain::id::MessageId;
use gdoormon_domain::identity::BareIdentity;
use gdoormon_domain::time::{Timestamp, now};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::ports::Broadcaster;
use crate::subscribers::SubscriberRegistry;

/// A notice addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub id: MessageId,
    pub to: BareIdentity,
    pub body: String,
    pub sent_at: Timestamp,
}

impl OutboundMessage {
    #[must_use]
    pub fn new(to: BareIdentity, body: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            to,
            body: body.into(),
            sent_at: now(),
        }
    }
}

/// Sending succeeds even when nobody is listening (the message is dropped).
#[derive(Debug)]
pub struct Outbox {
    sender: broadcast::Sender<OutboundMessage>,
}

impl Outbox {
    /// Create an outbox with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every message sent *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.sender.subscribe()
    }

    /// Queue one message. Returns the number of transports that will see it.
    pub fn send(&self, message: OutboundMessage) -> usize {
        tracing::debug!(to = %message.to, id = %message.id, "outbound message");
        // Zero receivers is the only failure and just means no transport is attached.
        self.sender.send(message).unwrap_or(0)
    }
}

/// [`Broadcaster`] that addresses the current subscribers through an [`Outbox`].
#[derive(Debug, Clone)]
pub struct OutboxBroadcaster {
    registry: SubscriberRegistry,
    outbox: Arc<Outbox>,
}

impl OutboxBroadcaster {
    #[must_use]
    pub fn new(registry: SubscriberRegistry, outbox: Arc<Outbox>) -> Self {
        Self { registry, outbox }
    }
}

impl Broadcaster for OutboxBroadcaster {
    fn send_all_subscribers(&self, text: &str) -> Result<(), GdoormonError> {
        let recipients = self.registry.all();
        if recipients.is_empty() {
            tracing::info!("no subscribers to notify");
        }
        for to in recipients {
            self.outbox.send(OutboundMessage::new(to, text));
        }
        Ok(())
    }
}
