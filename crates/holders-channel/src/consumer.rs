use tracing::{debug, info, warn};

use crate::error::ChannelError;
use crate::message::Message;
use crate::traits::{MessageChannel, QueueBinding, Subscription};

/// Bind a queue to `exchange` and feed every delivery to `callback`.
///
/// Deliveries are handled one at a time, in queue order. The loop runs until
/// the channel closes (returning `Ok(())`) or the callback fails, in which
/// case the error is returned and nothing further is consumed. On a
/// consumer-group queue a failed message is requeued for the next consumer;
/// on an exclusive queue it was already acknowledged at receipt and is lost.
///
/// Dropping the returned future cancels the loop.
pub async fn consume<C, F, E>(
    channel: &C,
    exchange: &str,
    binding: QueueBinding,
    callback: F,
) -> Result<(), E>
where
    C: MessageChannel + ?Sized,
    F: FnMut(&Message) -> Result<(), E> + Send,
    E: From<ChannelError> + std::fmt::Display,
{
    let stream = channel.subscribe(exchange, binding).await?;
    info!(queue = stream.queue_name(), exchange, "consuming");
    drain(stream, callback).await
}

/// Feed the deliveries of an already bound subscription to `callback`.
///
/// Same loop as [`consume`], for callers that must have the queue bound
/// before they start publishing.
pub async fn drain<F, E>(mut stream: Subscription, mut callback: F) -> Result<(), E>
where
    F: FnMut(&Message) -> Result<(), E> + Send,
    E: From<ChannelError> + std::fmt::Display,
{
    while let Some(delivery) = stream.next().await? {
        debug!(
            id = %delivery.message().id,
            tag = delivery.delivery_tag(),
            redelivered = delivery.redelivered(),
            "message received"
        );
        match callback(delivery.message()) {
            Ok(()) => delivery.ack(),
            Err(err) => {
                warn!(
                    queue = stream.queue_name(),
                    id = %delivery.message().id,
                    error = %err,
                    "callback failed, stopping consumer"
                );
                delivery.nack(true);
                return Err(err);
            }
        }
    }

    info!(queue = stream.queue_name(), "channel closed, consumer stopped");
    Ok(())
}
