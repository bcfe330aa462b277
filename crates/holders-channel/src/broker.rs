use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::error::{ChannelError, ChannelResult};
use crate::message::{Delivery, Message};
use crate::traits::{Acker, DeliveryStream, MessageChannel, QueueBinding, Subscription};

struct Queued {
    message: Message,
    redelivered: bool,
}

#[derive(Default)]
struct QueueState {
    ready: VecDeque<Queued>,
    unacked: usize,
    next_tag: u64,
    closed: bool,
}

/// A message queue. Exclusive queues live only as long as their subscriber
/// holds them; group queues are also held by the broker.
struct Queue {
    name: String,
    manual_ack: bool,
    state: Mutex<QueueState>,
    notify: Notify,
}

impl Queue {
    fn new(name: String, manual_ack: bool) -> Self {
        Self {
            name,
            manual_ack,
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
        }
    }

    fn push(&self, message: Message) {
        let mut state = self.state.lock().expect("queue lock poisoned");
        if state.closed {
            return;
        }
        state.ready.push_back(Queued {
            message,
            redelivered: false,
        });
        drop(state);
        self.notify.notify_waiters();
    }

    fn requeue(&self, message: Message) {
        let mut state = self.state.lock().expect("queue lock poisoned");
        state.unacked = state.unacked.saturating_sub(1);
        state.ready.push_front(Queued {
            message,
            redelivered: true,
        });
        drop(state);
        self.notify.notify_waiters();
    }

    fn settle(&self) {
        let mut state = self.state.lock().expect("queue lock poisoned");
        state.unacked = state.unacked.saturating_sub(1);
    }

    fn close(&self) {
        self.state.lock().expect("queue lock poisoned").closed = true;
        self.notify.notify_waiters();
    }

    fn depth(&self) -> usize {
        self.state.lock().expect("queue lock poisoned").ready.len()
    }
}

/// Settles a manual-ack delivery against its queue.
struct QueueAcker {
    queue: Arc<Queue>,
    message: Message,
}

impl Acker for QueueAcker {
    fn ack(self: Box<Self>) {
        self.queue.settle();
        trace!(queue = %self.queue.name, id = %self.message.id, "acked");
    }

    fn nack(self: Box<Self>, requeue: bool) {
        if requeue {
            debug!(queue = %self.queue.name, id = %self.message.id, "requeued");
            self.queue.requeue(self.message);
        } else {
            self.queue.settle();
        }
    }
}

/// A subscriber's view of one queue.
struct QueueStream {
    queue: Arc<Queue>,
}

#[async_trait]
impl DeliveryStream for QueueStream {
    async fn next(&mut self) -> ChannelResult<Option<Delivery>> {
        loop {
            let notified = self.queue.notify.notified();
            tokio::pin!(notified);
            // Register interest before checking so a push between the
            // check and the await is not missed.
            notified.as_mut().enable();

            {
                let mut state = self.queue.state.lock().expect("queue lock poisoned");
                if let Some(queued) = state.ready.pop_front() {
                    state.next_tag += 1;
                    let tag = state.next_tag;
                    let acker: Option<Box<dyn Acker>> = if self.queue.manual_ack {
                        state.unacked += 1;
                        Some(Box::new(QueueAcker {
                            queue: Arc::clone(&self.queue),
                            message: queued.message.clone(),
                        }))
                    } else {
                        None
                    };
                    return Ok(Some(Delivery::new(
                        queued.message,
                        tag,
                        queued.redelivered,
                        acker,
                    )));
                }
                if state.closed {
                    return Ok(None);
                }
            }

            notified.await;
        }
    }

    fn queue_name(&self) -> &str {
        &self.queue.name
    }
}

/// A fanout exchange: the list of queues bound to it.
#[derive(Default)]
struct Exchange {
    bindings: Vec<Weak<Queue>>,
}

impl Exchange {
    fn bind(&mut self, queue: &Arc<Queue>) {
        let already = self
            .bindings
            .iter()
            .any(|b| b.upgrade().is_some_and(|q| Arc::ptr_eq(&q, queue)));
        if !already {
            self.bindings.push(Arc::downgrade(queue));
        }
    }

    /// Deliver to every live binding; bindings whose queue is gone are pruned.
    fn route(&mut self, message: &Message) -> usize {
        let mut delivered = 0;
        self.bindings.retain(|binding| match binding.upgrade() {
            Some(queue) => {
                queue.push(message.clone());
                delivered += 1;
                true
            }
            None => false,
        });
        delivered
    }

    fn live_bindings(&self) -> usize {
        self.bindings.iter().filter(|b| b.strong_count() > 0).count()
    }
}

/// In-process broker with fanout exchanges.
///
/// Exchanges are declared implicitly on first use. A message published to an
/// exchange with no bound queue is dropped.
pub struct InMemoryBroker {
    exchanges: RwLock<HashMap<String, Exchange>>,
    group_queues: RwLock<HashMap<String, Arc<Queue>>>,
    closed: AtomicBool,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        info!("in-memory broker started");
        Self {
            exchanges: RwLock::new(HashMap::new()),
            group_queues: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Close the broker: further publishes fail and every open subscription
    /// ends once its queue is drained.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        for queue in self.group_queues.read().expect("broker lock poisoned").values() {
            queue.close();
        }
        let exchanges = self.exchanges.read().expect("broker lock poisoned");
        for exchange in exchanges.values() {
            for queue in exchange.bindings.iter().filter_map(Weak::upgrade) {
                queue.close();
            }
        }
        info!("in-memory broker closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of live queues bound to `exchange`.
    pub fn bound_queues(&self, exchange: &str) -> usize {
        self.exchanges
            .read()
            .expect("broker lock poisoned")
            .get(exchange)
            .map(Exchange::live_bindings)
            .unwrap_or(0)
    }

    /// Ready (undelivered) messages in a consumer-group queue.
    pub fn group_depth(&self, group: &str) -> usize {
        self.group_queues
            .read()
            .expect("broker lock poisoned")
            .get(group)
            .map(|q| q.depth())
            .unwrap_or(0)
    }

    fn ensure_open(&self) -> ChannelResult<()> {
        if self.is_closed() {
            Err(ChannelError::Closed)
        } else {
            Ok(())
        }
    }

    fn declare_queue(&self, binding: &QueueBinding) -> Arc<Queue> {
        match binding {
            QueueBinding::Exclusive => {
                let name = format!("amq.gen-{}", Uuid::now_v7().simple());
                Arc::new(Queue::new(name, false))
            }
            QueueBinding::Group(name) => {
                let mut queues = self.group_queues.write().expect("broker lock poisoned");
                Arc::clone(
                    queues
                        .entry(name.clone())
                        .or_insert_with(|| Arc::new(Queue::new(name.clone(), true))),
                )
            }
        }
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

fn check_exchange(exchange: &str) -> ChannelResult<()> {
    if exchange.trim().is_empty() {
        Err(ChannelError::InvalidExchange(exchange.to_string()))
    } else {
        Ok(())
    }
}

#[async_trait]
impl MessageChannel for InMemoryBroker {
    async fn publish(
        &self,
        body: Bytes,
        exchange: &str,
        routing_key: &str,
    ) -> ChannelResult<usize> {
        self.ensure_open()?;
        check_exchange(exchange)?;

        let message = Message::new(exchange, routing_key, body);
        let mut exchanges = self.exchanges.write().expect("broker lock poisoned");
        let delivered = exchanges.entry(exchange.to_string()).or_default().route(&message);

        debug!(id = %message.id, exchange, queues = delivered, "message published");
        Ok(delivered)
    }

    async fn subscribe(&self, exchange: &str, binding: QueueBinding) -> ChannelResult<Subscription> {
        self.ensure_open()?;
        check_exchange(exchange)?;

        let queue = self.declare_queue(&binding);
        self.exchanges
            .write()
            .expect("broker lock poisoned")
            .entry(exchange.to_string())
            .or_default()
            .bind(&queue);

        info!(queue = %queue.name, exchange, %binding, "queue bound");
        Ok(Box::new(QueueStream { queue }))
    }
}

impl std::fmt::Debug for InMemoryBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let exchanges = self.exchanges.read().expect("broker lock poisoned").len();
        let groups = self.group_queues.read().expect("broker lock poisoned").len();
        f.debug_struct("InMemoryBroker")
            .field("exchanges", &exchanges)
            .field("group_queues", &groups)
            .field("closed", &self.is_closed())
            .finish()
    }
}
