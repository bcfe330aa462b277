use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use holders_channel::InMemoryBroker;
use holders_ledger::InMemoryLedger;
use holders_replication::{ChangePublisher, ReplicationConsumer, Replicator, ShareService};
use holders_store::InMemoryReadStore;

use crate::config::AppConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// The assembled application: canonical store, read store, channel, and the
/// replication pipeline wired according to [`AppConfig`].
pub struct HoldersServer {
    config: AppConfig,
    broker: Arc<InMemoryBroker>,
    replicator: Arc<Replicator>,
    state: AppState,
}

impl HoldersServer {
    pub fn new(config: AppConfig) -> Self {
        let ledger = Arc::new(InMemoryLedger::new());
        let store = Arc::new(InMemoryReadStore::with_collection(
            config.read_store.collection.clone(),
        ));
        let broker = Arc::new(InMemoryBroker::new());
        let replicator = Arc::new(Replicator::new(
            ledger.clone(),
            store.clone(),
            config.replication.clone(),
        ));

        let publisher = if config.replication.synchronous {
            ChangePublisher::synchronous(replicator.clone())
        } else {
            ChangePublisher::asynchronous(broker.clone(), config.broker.exchange.clone())
        };
        let service = Arc::new(ShareService::new(ledger, publisher));

        Self {
            state: AppState::new(service, store),
            config,
            broker,
            replicator,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// The consumer that drains the channel, or `None` in synchronous mode.
    pub fn consumer(&self) -> Option<ReplicationConsumer> {
        if self.config.replication.synchronous {
            return None;
        }
        Some(ReplicationConsumer::new(
            self.broker.clone(),
            self.replicator.clone(),
            self.config.broker.exchange.clone(),
            ReplicationConsumer::binding_for(&self.config.replication),
        ))
    }

    /// Bind the consumer's queue and spawn it. Returns once the queue exists,
    /// so no event published afterwards is dropped. `None` in synchronous
    /// mode.
    pub async fn start_consumer(&self) -> ServerResult<Option<JoinHandle<()>>> {
        let Some(consumer) = self.consumer() else {
            return Ok(None);
        };
        let stream = consumer.subscribe().await?;
        Ok(Some(tokio::spawn(async move {
            if let Err(e) = consumer.run_on(stream).await {
                error!(error = %e, "replication consumer stopped");
            }
        })))
    }

    /// Start serving requests until ctrl-c, running the consumer alongside
    /// in asynchronous mode.
    pub async fn serve(self) -> ServerResult<()> {
        let consumer = self.start_consumer().await?;

        let app = self.router();
        let listener = TcpListener::bind(self.config.server.bind_addr).await?;
        info!(
            addr = %self.config.server.bind_addr,
            synchronous = self.config.replication.synchronous,
            "holders server listening"
        );
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutdown requested");
            })
            .await
            .map_err(|e| ServerError::Internal(e.to_string()));

        self.broker.close();
        if let Some(handle) = consumer {
            let _ = handle.await;
        }
        served
    }
}
