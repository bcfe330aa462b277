use bytes::Bytes;
use uuid::Uuid;

use holders_types::ShareId;

use crate::error::{ChannelError, ChannelResult};
use crate::traits::Acker;

/// A message as routed by the broker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Broker-assigned identifier (UUID v7, time ordered).
    pub id: Uuid,
    pub exchange: String,
    pub routing_key: String,
    pub body: Bytes,
}

impl Message {
    pub fn new(exchange: impl Into<String>, routing_key: impl Into<String>, body: Bytes) -> Self {
        Self {
            id: Uuid::now_v7(),
            exchange: exchange.into(),
            routing_key: routing_key.into(),
            body,
        }
    }
}

/// A message handed to a subscriber, plus the means to settle it.
///
/// Deliveries from auto-ack queues carry no acker; `ack` and `nack` are then
/// no-ops because the broker already forgot the message. A manual-ack
/// delivery that is dropped unsettled is requeued.
pub struct Delivery {
    message: Message,
    delivery_tag: u64,
    redelivered: bool,
    acker: Option<Box<dyn Acker>>,
}

impl Delivery {
    pub fn new(
        message: Message,
        delivery_tag: u64,
        redelivered: bool,
        acker: Option<Box<dyn Acker>>,
    ) -> Self {
        Self {
            message,
            delivery_tag,
            redelivered,
            acker,
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn delivery_tag(&self) -> u64 {
        self.delivery_tag
    }

    /// Whether this message was handed out before and given back.
    pub fn redelivered(&self) -> bool {
        self.redelivered
    }

    pub fn ack(mut self) {
        if let Some(acker) = self.acker.take() {
            acker.ack();
        }
    }

    pub fn nack(mut self, requeue: bool) {
        if let Some(acker) = self.acker.take() {
            acker.nack(requeue);
        }
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        if let Some(acker) = self.acker.take() {
            acker.nack(true);
        }
    }
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("message", &self.message)
            .field("delivery_tag", &self.delivery_tag)
            .field("redelivered", &self.redelivered)
            .field("manual_ack", &self.acker.is_some())
            .finish()
    }
}

/// Replication event: "share `share_id` was committed".
///
/// On the wire the payload is the share id in decimal ASCII and nothing
/// else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShareEvent {
    pub share_id: ShareId,
}

impl ShareEvent {
    pub fn new(share_id: ShareId) -> Self {
        Self { share_id }
    }

    pub fn encode(&self) -> Bytes {
        Bytes::from(self.share_id.to_string())
    }

    /// Parse a payload. Surrounding whitespace is tolerated.
    pub fn decode(body: &[u8]) -> ChannelResult<Self> {
        let text = std::str::from_utf8(body)
            .map_err(|_| ChannelError::MalformedIdentifier(String::from_utf8_lossy(body).into()))?;
        text.parse::<ShareId>()
            .map(Self::new)
            .map_err(|_| ChannelError::MalformedIdentifier(text.to_string()))
    }
}
