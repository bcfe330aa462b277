use std::sync::Arc;

use tracing::info;

use holders_channel::{drain, MessageChannel, QueueBinding, Subscription};

use crate::config::ReplicationConfig;
use crate::error::ReplicationResult;
use crate::replicator::Replicator;

/// Long-running consumer that replicates every share event it receives.
pub struct ReplicationConsumer {
    channel: Arc<dyn MessageChannel>,
    replicator: Arc<Replicator>,
    exchange: String,
    binding: QueueBinding,
}

impl ReplicationConsumer {
    pub fn new(
        channel: Arc<dyn MessageChannel>,
        replicator: Arc<Replicator>,
        exchange: impl Into<String>,
        binding: QueueBinding,
    ) -> Self {
        Self {
            channel,
            replicator,
            exchange: exchange.into(),
            binding,
        }
    }

    /// The queue binding a config asks for: a shared group queue when a
    /// consumer group is named, otherwise a private broadcast queue.
    pub fn binding_for(config: &ReplicationConfig) -> QueueBinding {
        match &config.consumer_group {
            Some(group) => QueueBinding::group(group.clone()),
            None => QueueBinding::Exclusive,
        }
    }

    /// Bind the consumer's queue. Events published after this returns are
    /// held for [`run_on`](Self::run_on).
    pub async fn subscribe(&self) -> ReplicationResult<Subscription> {
        let stream = self
            .channel
            .subscribe(&self.exchange, self.binding.clone())
            .await?;
        info!(
            exchange = %self.exchange,
            binding = %self.binding,
            queue = stream.queue_name(),
            "replication consumer bound"
        );
        Ok(stream)
    }

    /// Replicate every event on `stream` until the channel closes or a
    /// message fails to replicate. Merges run on the calling task.
    pub async fn run_on(&self, stream: Subscription) -> ReplicationResult<()> {
        drain(stream, |message| {
            info!(payload = %String::from_utf8_lossy(&message.body), "share event received");
            self.replicator.handle_message(message).map(|_| ())
        })
        .await
    }

    /// Bind and consume in one step.
    pub async fn run(&self) -> ReplicationResult<()> {
        let stream = self.subscribe().await?;
        self.run_on(stream).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holders_channel::InMemoryBroker;
    use holders_ledger::InMemoryLedger;
    use holders_store::InMemoryReadStore;

    use crate::error::ReplicationError;

    #[test]
    fn binding_follows_consumer_group() {
        let mut config = ReplicationConfig::default();
        assert_eq!(ReplicationConsumer::binding_for(&config), QueueBinding::Exclusive);
        config.consumer_group = Some("read-model".into());
        assert_eq!(
            ReplicationConsumer::binding_for(&config),
            QueueBinding::group("read-model")
        );
    }

    #[tokio::test]
    async fn subscribe_binds_before_running() {
        let broker = Arc::new(InMemoryBroker::new());
        let replicator = Arc::new(Replicator::new(
            Arc::new(InMemoryLedger::new()),
            Arc::new(InMemoryReadStore::new()),
            ReplicationConfig::default(),
        ));
        let consumer =
            ReplicationConsumer::new(broker.clone(), replicator, "shares", QueueBinding::Exclusive);

        let stream = consumer.subscribe().await.unwrap();
        assert_eq!(broker.bound_queues("shares"), 1);
        assert_eq!(broker.publish("5".into(), "shares", "").await.unwrap(), 1);

        let err = consumer.run_on(stream).await.unwrap_err();
        assert!(matches!(err, ReplicationError::ShareNotFound(_)));
    }

    #[tokio::test]
    async fn unknown_share_stops_the_consumer() {
        let broker = Arc::new(InMemoryBroker::new());
        let replicator = Arc::new(Replicator::new(
            Arc::new(InMemoryLedger::new()),
            Arc::new(InMemoryReadStore::new()),
            ReplicationConfig::default(),
        ));
        drop(broker.subscribe("shares", QueueBinding::group("rm")).await.unwrap());
        broker.publish("99".into(), "shares", "").await.unwrap();

        let consumer =
            ReplicationConsumer::new(broker.clone(), replicator, "shares", QueueBinding::group("rm"));
        let err = consumer.run().await.unwrap_err();
        assert!(matches!(err, ReplicationError::ShareNotFound(_)));
        assert_eq!(broker.group_depth("rm"), 1);
    }
}
