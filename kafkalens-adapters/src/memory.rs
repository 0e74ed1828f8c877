//! In-memory gateway.
//!
//! Holds a small cluster in process memory: topics with message logs,
//! consumer groups and named contexts. Live consumers are fed through a
//! broadcast channel, so messages produced while a topic view is open show
//! up the same way they would from a broker.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kafkalens_types::{ConsumeFlags, ConsumedMessage, GroupMeta, OffsetPolicy, TopicMeta};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{Gateway, GatewayError, MessageHandler};

/// Capacity of the live feed shared by all consumers.
const FEED_CAPACITY: usize = 1024;

/// A gateway backed by process memory.
#[derive(Debug)]
pub struct MemoryGateway {
    state: Mutex<ClusterState>,
    feed: broadcast::Sender<(String, ConsumedMessage)>,
    listing_calls: AtomicUsize,
}

#[derive(Debug, Default)]
struct ClusterState {
    current_context: String,
    contexts: Vec<String>,
    topics: BTreeMap<String, TopicLog>,
    groups: Vec<GroupMeta>,
    listing_failure: Option<GatewayError>,
    consume_failure: Option<GatewayError>,
}

#[derive(Debug, Default)]
struct TopicLog {
    partitions: i32,
    replication_factor: i32,
    messages: Vec<ConsumedMessage>,
    next_offsets: BTreeMap<i32, i64>,
}

impl MemoryGateway {
    /// Create an empty cluster whose only context is `context`.
    pub fn new(context: &str) -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            state: Mutex::new(ClusterState {
                current_context: context.to_string(),
                contexts: vec![context.to_string()],
                ..ClusterState::default()
            }),
            feed,
            listing_calls: AtomicUsize::new(0),
        }
    }

    /// A cluster pre-populated with a few topics, groups and contexts.
    pub fn demo() -> Self {
        let gateway = Self::new("local");
        gateway.add_context("staging");
        gateway.add_context("production");
        gateway.add_topic("orders", TopicMeta::new(3, 3, 0));
        gateway.add_topic("payments", TopicMeta::new(2, 3, 0));
        gateway.add_topic("audit-log", TopicMeta::new(1, 1, 0));
        gateway.add_topic("topic2", TopicMeta::new(1, 1, 0));
        gateway.add_topic("topic10", TopicMeta::new(1, 1, 0));
        gateway.add_group(GroupMeta::new("order-processor", "Stable", 3));
        gateway.add_group(GroupMeta::new("payment-reconciler", "Stable", 1));
        gateway.add_group(GroupMeta::new("audit-archiver", "Empty", 0));

        for n in 0..120 {
            gateway.produce("orders", n % 3, format!("order-{}", n), demo_order(n as u64));
        }
        for n in 0..40 {
            gateway.produce(
                "payments",
                n % 2,
                format!("payment-{}", n),
                serde_json::json!({ "payment_id": n, "amount_cents": 1999 + n * 7 }).to_string(),
            );
        }
        gateway
    }

    /// Register an additional context name.
    pub fn add_context(&self, name: &str) {
        let mut state = self.state.lock();
        if !state.contexts.iter().any(|c| c == name) {
            state.contexts.push(name.to_string());
        }
    }

    /// Create (or replace the metadata of) a topic.
    ///
    /// The message count in `meta` is ignored; it is derived from the log.
    pub fn add_topic(&self, name: &str, meta: TopicMeta) {
        let mut state = self.state.lock();
        let log = state.topics.entry(name.to_string()).or_default();
        log.partitions = meta.partitions.max(1);
        log.replication_factor = meta.replication_factor;
    }

    /// Remove a topic and its messages.
    pub fn remove_topic(&self, name: &str) {
        self.state.lock().topics.remove(name);
    }

    /// Add a consumer group.
    pub fn add_group(&self, group: GroupMeta) {
        self.state.lock().groups.push(group);
    }

    /// Append a message to `topic` at the next offset of `partition`.
    pub fn produce(
        &self,
        topic: &str,
        partition: i32,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> ConsumedMessage {
        let message = {
            let mut state = self.state.lock();
            let log = state.topics.entry(topic.to_string()).or_default();
            log.partitions = log.partitions.max(partition + 1);
            let offset = log.next_offsets.entry(partition).or_insert(0);
            let message = ConsumedMessage::builder(partition, *offset)
                .key(key)
                .value(value)
                .build();
            *offset += 1;
            log.messages.push(message.clone());
            message
        };
        let _ = self.feed.send((topic.to_string(), message.clone()));
        message
    }

    /// Append a message exactly as given, including re-deliveries of an
    /// already used `(partition, offset)`.
    pub fn publish(&self, topic: &str, message: ConsumedMessage) {
        {
            let mut state = self.state.lock();
            let log = state.topics.entry(topic.to_string()).or_default();
            log.partitions = log.partitions.max(message.partition + 1);
            let next = log.next_offsets.entry(message.partition).or_insert(0);
            *next = (*next).max(message.offset + 1);
            log.messages.push(message.clone());
        }
        let _ = self.feed.send((topic.to_string(), message));
    }

    /// Make the next listing call (of any kind) fail with `error`.
    pub fn fail_next_listing(&self, error: GatewayError) {
        self.state.lock().listing_failure = Some(error);
    }

    /// Make the next consumption fail with `error` before any message.
    pub fn fail_next_consume(&self, error: GatewayError) {
        self.state.lock().consume_failure = Some(error);
    }

    /// Number of listing calls served so far.
    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    /// Produce demo traffic on `orders` and `payments` until `cancel` fires.
    pub fn spawn_traffic(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let gateway = Arc::clone(self);
        tokio::spawn(async move {
            let mut n: u64 = 1_000;
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        gateway.produce("orders", (n % 3) as i32, format!("order-{}", n), demo_order(n));
                        if n % 4 == 0 {
                            gateway.produce(
                                "payments",
                                (n % 2) as i32,
                                format!("payment-{}", n),
                                serde_json::json!({ "payment_id": n, "amount_cents": n * 13 % 10_000 }).to_string(),
                            );
                        }
                        n += 1;
                    }
                }
            }
            debug!("demo traffic stopped");
        })
    }

    fn begin_listing(&self) -> Result<parking_lot::MutexGuard<'_, ClusterState>, GatewayError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        match state.listing_failure.take() {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

fn demo_order(n: u64) -> String {
    const STATUSES: [&str; 4] = ["created", "paid", "shipped", "delivered"];
    serde_json::json!({
        "order_id": n,
        "customer": format!("customer-{}", n % 17),
        "status": STATUSES[(n % 4) as usize],
        "items": (n % 5) + 1,
    })
    .to_string()
}

/// Messages a new consumer starts with, given its flags.
fn select_backlog(messages: &[ConsumedMessage], flags: ConsumeFlags) -> Vec<ConsumedMessage> {
    match flags.offset_policy {
        OffsetPolicy::Earliest => messages.to_vec(),
        OffsetPolicy::Latest => {
            let tail = flags.tail.max(0) as usize;
            let mut totals: BTreeMap<i32, usize> = BTreeMap::new();
            for m in messages {
                *totals.entry(m.partition).or_default() += 1;
            }
            let mut seen: BTreeMap<i32, usize> = BTreeMap::new();
            messages
                .iter()
                .filter(|m| {
                    let index = seen.entry(m.partition).or_default();
                    let keep = *index + tail >= totals[&m.partition];
                    *index += 1;
                    keep
                })
                .cloned()
                .collect()
        }
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn list_topics(&self) -> Result<BTreeMap<String, TopicMeta>, GatewayError> {
        let state = self.begin_listing()?;
        Ok(state
            .topics
            .iter()
            .map(|(name, log)| {
                (
                    name.clone(),
                    TopicMeta::new(
                        log.partitions,
                        log.replication_factor,
                        log.messages.len() as i64,
                    ),
                )
            })
            .collect())
    }

    async fn list_contexts(&self) -> Result<Vec<String>, GatewayError> {
        let state = self.begin_listing()?;
        Ok(state.contexts.clone())
    }

    async fn list_consumer_groups(&self) -> Result<Vec<GroupMeta>, GatewayError> {
        let state = self.begin_listing()?;
        Ok(state.groups.clone())
    }

    fn current_context(&self) -> String {
        self.state.lock().current_context.clone()
    }

    async fn set_context(&self, name: &str) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        if !state.contexts.iter().any(|c| c == name) {
            return Err(GatewayError::UnknownContext(name.to_string()));
        }
        state.current_context = name.to_string();
        Ok(())
    }

    async fn consume_topic(
        &self,
        topic: &str,
        flags: ConsumeFlags,
        cancel: CancellationToken,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), GatewayError> {
        // Subscribe before reading the backlog so nothing produced in between is lost.
        let mut live = self.feed.subscribe();
        let backlog = {
            let mut state = self.state.lock();
            if let Some(err) = state.consume_failure.take() {
                return Err(err);
            }
            let log = state
                .topics
                .get(topic)
                .ok_or_else(|| GatewayError::UnknownTopic(topic.to_string()))?;
            select_backlog(&log.messages, flags)
        };

        for message in backlog {
            if cancel.is_cancelled() {
                return Ok(());
            }
            handler.on_message(message);
        }

        if !flags.follow {
            return Ok(());
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                received = live.recv() => match received {
                    Ok((name, message)) => {
                        if name == topic {
                            handler.on_message(message);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        handler.on_error(GatewayError::Consume(format!(
                            "consumer lagged behind, skipped {} messages",
                            skipped
                        )));
                    }
                    Err(broadcast::error::RecvError::Closed) => return Ok(()),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect(Mutex<Vec<ConsumedMessage>>);

    impl MessageHandler for Collect {
        fn on_message(&self, message: ConsumedMessage) {
            self.0.lock().push(message);
        }
    }

    fn gateway_with_orders(count: i32) -> MemoryGateway {
        let gateway = MemoryGateway::new("local");
        gateway.add_topic("orders", TopicMeta::new(2, 1, 0));
        for n in 0..count {
            gateway.produce("orders", n % 2, format!("k{}", n), format!("v{}", n));
        }
        gateway
    }

    #[tokio::test]
    async fn test_list_topics_counts_messages() {
        let gateway = gateway_with_orders(10);
        let topics = gateway.list_topics().await.unwrap();
        assert_eq!(topics["orders"], TopicMeta::new(2, 1, 10));
        assert_eq!(gateway.listing_calls(), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_is_one_shot() {
        let gateway = gateway_with_orders(1);
        gateway.fail_next_listing(GatewayError::Timeout);
        assert_eq!(gateway.list_topics().await, Err(GatewayError::Timeout));
        assert!(gateway.list_topics().await.is_ok());
    }

    #[tokio::test]
    async fn test_set_context_rejects_unknown() {
        let gateway = MemoryGateway::new("local");
        gateway.add_context("staging");
        gateway.set_context("staging").await.unwrap();
        assert_eq!(gateway.current_context(), "staging");
        assert_eq!(
            gateway.set_context("nope").await,
            Err(GatewayError::UnknownContext("nope".to_string()))
        );
        assert_eq!(gateway.current_context(), "staging");
    }

    #[tokio::test]
    async fn test_consume_earliest_without_follow_returns() {
        let gateway = gateway_with_orders(6);
        let sink = Arc::new(Collect::default());
        let flags = ConsumeFlags::new(OffsetPolicy::Earliest, 0, false);
        gateway
            .consume_topic("orders", flags, CancellationToken::new(), sink.clone())
            .await
            .unwrap();
        assert_eq!(sink.0.lock().len(), 6);
    }

    #[tokio::test]
    async fn test_consume_latest_takes_tail_per_partition() {
        let gateway = gateway_with_orders(10);
        let sink = Arc::new(Collect::default());
        let flags = ConsumeFlags::new(OffsetPolicy::Latest, 2, false);
        gateway
            .consume_topic("orders", flags, CancellationToken::new(), sink.clone())
            .await
            .unwrap();
        let got: Vec<(i32, i64)> = sink.0.lock().iter().map(|m| m.position()).collect();
        assert_eq!(got, vec![(0, 3), (1, 3), (0, 4), (1, 4)]);
    }

    #[tokio::test]
    async fn test_consume_unknown_topic() {
        let gateway = MemoryGateway::new("local");
        let sink = Arc::new(Collect::default());
        let result = gateway
            .consume_topic("ghost", ConsumeFlags::default(), CancellationToken::new(), sink)
            .await;
        assert_eq!(result, Err(GatewayError::UnknownTopic("ghost".to_string())));
    }

    #[tokio::test]
    async fn test_follow_receives_live_messages_until_cancelled() {
        let gateway = Arc::new(gateway_with_orders(0));
        let sink = Arc::new(Collect::default());
        let cancel = CancellationToken::new();

        let task = {
            let gateway = gateway.clone();
            let sink = sink.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                gateway
                    .consume_topic("orders", ConsumeFlags::default(), cancel, sink)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        gateway.produce("orders", 0, "a", "1");
        gateway.produce("other", 0, "b", "2");
        tokio::time::sleep(Duration::from_millis(20)).await;

        cancel.cancel();
        assert_eq!(task.await.unwrap(), Ok(()));
        assert_eq!(sink.0.lock().len(), 1);
    }
}
