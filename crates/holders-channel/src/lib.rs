//! Message channel for the shareholder ledger.
//!
//! Models a broker with fanout exchanges: every queue bound to an exchange
//! receives every message published to it. Two queue flavours exist:
//!
//! - [`QueueBinding::Exclusive`] -- anonymous, private to one subscriber,
//!   deleted when the subscriber goes away, acknowledged at receipt
//!   (at-most-once).
//! - [`QueueBinding::Group`] -- named and shared by a consumer group,
//!   acknowledged only after the callback succeeds (at-least-once).
//!
//! [`consume`] and [`drain`] drive a subscription through a callback, and
//! [`ShareEvent`] is the wire codec for replication events.

pub mod broker;
pub mod consumer;
pub mod error;
pub mod message;
pub mod traits;

pub use broker::InMemoryBroker;
pub use consumer::{consume, drain};
pub use error::{ChannelError, ChannelResult};
pub use message::{Delivery, Message, ShareEvent};
pub use traits::{Acker, DeliveryStream, MessageChannel, QueueBinding, Subscription};

/// Exchange used when none is configured.
pub const DEFAULT_EXCHANGE: &str = "shares";
