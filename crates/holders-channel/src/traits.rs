use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ChannelResult;
use crate::message::Delivery;

/// How a subscriber's queue is declared and bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueueBinding {
    /// Anonymous exclusive queue, auto-deleted with its subscriber and
    /// acknowledged at receipt. Every subscriber sees every message.
    Exclusive,
    /// Named queue shared by a consumer group. Subscribers compete for
    /// messages, and a message leaves the queue only once acknowledged.
    Group(String),
}

impl QueueBinding {
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(name.into())
    }

    /// Whether deliveries on this queue wait for an explicit ack.
    pub fn manual_ack(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

impl fmt::Display for QueueBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclusive => write!(f, "exclusive"),
            Self::Group(name) => write!(f, "group:{name}"),
        }
    }
}

/// Settles one delivery with the broker.
pub trait Acker: Send {
    /// Remove the message from its queue for good.
    fn ack(self: Box<Self>);

    /// Give the message back. With `requeue` it goes to the head of the
    /// queue and is redelivered; without it the message is dropped.
    fn nack(self: Box<Self>, requeue: bool);
}

/// An open subscription yielding deliveries in queue order.
#[async_trait]
pub trait DeliveryStream: Send {
    /// Wait for the next delivery. Returns `Ok(None)` once the channel closes.
    async fn next(&mut self) -> ChannelResult<Option<Delivery>>;

    /// Name of the queue backing this subscription.
    fn queue_name(&self) -> &str;
}

/// Boxed subscription returned by [`MessageChannel::subscribe`].
pub type Subscription = Box<dyn DeliveryStream>;

/// Publish/subscribe transport with fanout exchanges.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Send `body` to every queue bound to `exchange`.
    ///
    /// Fire-and-forget: the return value is the number of queues the message
    /// was routed to, and `0` means it was dropped. The routing key is carried
    /// on the message but ignored by fanout routing.
    async fn publish(&self, body: Bytes, exchange: &str, routing_key: &str)
        -> ChannelResult<usize>;

    /// Declare a queue according to `binding`, bind it to `exchange`, and
    /// start receiving from it.
    async fn subscribe(&self, exchange: &str, binding: QueueBinding) -> ChannelResult<Subscription>;
}
