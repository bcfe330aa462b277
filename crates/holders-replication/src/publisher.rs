use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use holders_channel::MessageChannel;

use crate::error::{ReplicationError, ReplicationResult};
use crate::events::ShareCreated;
use crate::replicator::{ReplicationOutcome, Replicator};

/// What happened to a [`ShareCreated`] event.
#[derive(Clone, Debug, PartialEq)]
pub enum Dispatch {
    /// Merged inline before the write returned.
    Replicated(ReplicationOutcome),
    /// Handed to the channel. `queues` is how many queues received it; zero
    /// means no consumer was bound and the event was dropped.
    Published { exchange: String, queues: usize },
}

enum Mode {
    Synchronous(Arc<Replicator>),
    Asynchronous {
        channel: Arc<dyn MessageChannel>,
        exchange: String,
    },
}

/// Routes share-created events to the replicator, directly or via the
/// message channel.
pub struct ChangePublisher {
    mode: Mode,
}

impl ChangePublisher {
    /// Replicate before returning. The merge runs on the blocking pool.
    pub fn synchronous(replicator: Arc<Replicator>) -> Self {
        Self {
            mode: Mode::Synchronous(replicator),
        }
    }

    /// Publish share ids to `exchange` for a consumer to pick up.
    pub fn asynchronous(channel: Arc<dyn MessageChannel>, exchange: impl Into<String>) -> Self {
        Self {
            mode: Mode::Asynchronous {
                channel,
                exchange: exchange.into(),
            },
        }
    }

    pub fn is_synchronous(&self) -> bool {
        matches!(self.mode, Mode::Synchronous(_))
    }

    pub async fn publish(&self, event: &ShareCreated) -> ReplicationResult<Dispatch> {
        match &self.mode {
            Mode::Synchronous(replicator) => {
                let replicator = Arc::clone(replicator);
                let share = event.share.clone();
                let outcome = tokio::task::spawn_blocking(move || replicator.replicate(&share))
                    .await
                    .map_err(|e| ReplicationError::Worker(e.to_string()))??;
                Ok(Dispatch::Replicated(outcome))
            }
            Mode::Asynchronous { channel, exchange } => {
                let body = event.to_wire().encode();
                let queues = channel.publish(body, exchange, "").await?;
                if queues == 0 {
                    warn!(share_id = %event.share.id, exchange = %exchange, "no queue bound, share event dropped");
                } else {
                    debug!(share_id = %event.share.id, exchange = %exchange, queues, "share event published");
                }
                Ok(Dispatch::Published {
                    exchange: exchange.clone(),
                    queues,
                })
            }
        }
    }
}

impl fmt::Debug for ChangePublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mode {
            Mode::Synchronous(_) => f.debug_struct("ChangePublisher").field("mode", &"sync").finish(),
            Mode::Asynchronous { exchange, .. } => f
                .debug_struct("ChangePublisher")
                .field("mode", &"async")
                .field("exchange", exchange)
                .finish(),
        }
    }
}
