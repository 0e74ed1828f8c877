//! Kafka gateway backed by librdkafka.
//!
//! Each configured context is a named broker profile. Metadata requests go
//! through a long-lived `BaseConsumer` for the active profile; every topic
//! view gets its own `StreamConsumer` with an explicit partition assignment,
//! so no consumer group is joined and no offsets are committed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kafkalens_adapters::{Gateway, KafkaGateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = KafkaGateway::builder()
//!         .profile("local", "localhost:9092")
//!         .profile("staging", "kafka.staging:9092")
//!         .current("local")
//!         .build()?;
//!
//!     for (name, meta) in gateway.list_topics().await? {
//!         println!("{}: {} partitions", name, meta.partitions);
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use kafkalens_types::{ConsumeFlags, ConsumedMessage, GroupMeta, MessageHeader, OffsetPolicy, TopicMeta};
use parking_lot::RwLock;
use rdkafka::config::{ClientConfig, RDKafkaLogLevel};
use rdkafka::consumer::{BaseConsumer, Consumer, StreamConsumer};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::message::{BorrowedMessage, Headers, Message};
use rdkafka::{Offset, TopicPartitionList};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{wire, Gateway, GatewayError, MessageHandler};

/// A named set of bootstrap brokers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerProfile {
    pub name: String,
    pub brokers: String,
}

impl BrokerProfile {
    pub fn new(name: impl Into<String>, brokers: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brokers: brokers.into(),
        }
    }
}

struct ActiveContext {
    profile: BrokerProfile,
    metadata: Arc<BaseConsumer>,
}

/// Gateway talking to real Kafka brokers.
pub struct KafkaGateway {
    profiles: Vec<BrokerProfile>,
    active: RwLock<ActiveContext>,
    timeout: Duration,
}

impl KafkaGateway {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> KafkaGatewayBuilder {
        KafkaGatewayBuilder::default()
    }

    fn metadata_client(&self) -> Arc<BaseConsumer> {
        Arc::clone(&self.active.read().metadata)
    }
}

impl std::fmt::Debug for KafkaGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaGateway")
            .field("profiles", &self.profiles)
            .field("current", &self.active.read().profile.name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn client_config(brokers: &str) -> ClientConfig {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut config = ClientConfig::new();
    config
        .set("bootstrap.servers", brokers)
        .set("group.id", format!("kafkalens-{}-{}", std::process::id(), nanos))
        .set("enable.auto.commit", "false")
        .set("enable.partition.eof", "false")
        .set_log_level(RDKafkaLogLevel::Emerg);
    config
}

async fn blocking<T, F>(f: F) -> Result<T, GatewayError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, GatewayError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| GatewayError::Metadata(e.to_string()))?
}

/// Partition assignment for a topic view plus, per partition, the offset
/// at which a non-following view is done.
fn plan_assignment(
    consumer: &StreamConsumer,
    topic: &str,
    flags: ConsumeFlags,
    timeout: Duration,
) -> Result<(TopicPartitionList, HashMap<i32, i64>), GatewayError> {
    let metadata = consumer.fetch_metadata(Some(topic), timeout)?;
    let topic_md = metadata
        .topics()
        .iter()
        .find(|t| t.name() == topic)
        .filter(|t| t.error().is_none() && !t.partitions().is_empty())
        .ok_or_else(|| GatewayError::UnknownTopic(topic.to_string()))?;

    let start = match flags.offset_policy {
        OffsetPolicy::Earliest => Offset::Beginning,
        OffsetPolicy::Latest if flags.tail > 0 => Offset::OffsetTail(i64::from(flags.tail)),
        OffsetPolicy::Latest => Offset::End,
    };
    let reads_backlog = flags.offset_policy == OffsetPolicy::Earliest || flags.tail > 0;

    let mut assignment = TopicPartitionList::new();
    let mut end_offsets = HashMap::new();
    for partition in topic_md.partitions() {
        assignment.add_partition_offset(topic, partition.id(), start)?;
        let (low, high) = consumer.fetch_watermarks(topic, partition.id(), timeout)?;
        if reads_backlog && high > low {
            end_offsets.insert(partition.id(), high);
        }
    }
    Ok((assignment, end_offsets))
}

fn convert(message: &BorrowedMessage<'_>) -> ConsumedMessage {
    let (key_schema_id, key) = wire::decode_payload(message.key());
    let (value_schema_id, value) = wire::decode_payload(message.payload());
    let headers = message
        .headers()
        .map(|headers| {
            headers
                .iter()
                .map(|h| {
                    let value = h
                        .value
                        .map(|v| String::from_utf8_lossy(v).into_owned())
                        .unwrap_or_default();
                    MessageHeader::new(h.key, value)
                })
                .collect()
        })
        .unwrap_or_default();

    ConsumedMessage {
        key,
        value,
        offset: message.offset(),
        partition: message.partition(),
        key_schema_id,
        value_schema_id,
        headers,
        timestamp_ms: message.timestamp().to_millis(),
    }
}

/// Consumption errors that librdkafka recovers from by itself.
fn is_transient(code: RDKafkaErrorCode) -> bool {
    matches!(
        code,
        RDKafkaErrorCode::BrokerTransportFailure
            | RDKafkaErrorCode::AllBrokersDown
            | RDKafkaErrorCode::OperationTimedOut
            | RDKafkaErrorCode::NotLeaderForPartition
    )
}

#[async_trait]
impl Gateway for KafkaGateway {
    async fn list_topics(&self) -> Result<BTreeMap<String, TopicMeta>, GatewayError> {
        let consumer = self.metadata_client();
        let timeout = self.timeout;
        blocking(move || {
            let metadata = consumer.fetch_metadata(None, timeout)?;
            let mut topics = BTreeMap::new();
            for topic in metadata.topics() {
                let partitions = topic.partitions();
                let replication = partitions
                    .first()
                    .map(|p| p.replicas().len() as i32)
                    .unwrap_or(0);
                let mut count = 0i64;
                for partition in partitions {
                    if let Ok((low, high)) =
                        consumer.fetch_watermarks(topic.name(), partition.id(), timeout)
                    {
                        count += (high - low).max(0);
                    }
                }
                topics.insert(
                    topic.name().to_string(),
                    TopicMeta::new(partitions.len() as i32, replication, count),
                );
            }
            Ok(topics)
        })
        .await
    }

    async fn list_contexts(&self) -> Result<Vec<String>, GatewayError> {
        Ok(self.profiles.iter().map(|p| p.name.clone()).collect())
    }

    async fn list_consumer_groups(&self) -> Result<Vec<GroupMeta>, GatewayError> {
        let consumer = self.metadata_client();
        let timeout = self.timeout;
        blocking(move || {
            let list = consumer.fetch_group_list(None, timeout)?;
            Ok(list
                .groups()
                .iter()
                .map(|g| GroupMeta::new(g.name(), g.state(), g.members().len()))
                .collect())
        })
        .await
    }

    fn current_context(&self) -> String {
        self.active.read().profile.name.clone()
    }

    async fn set_context(&self, name: &str) -> Result<(), GatewayError> {
        let profile = self
            .profiles
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownContext(name.to_string()))?;
        let metadata: BaseConsumer = client_config(&profile.brokers).create()?;
        info!(context = %profile.name, brokers = %profile.brokers, "switched context");
        *self.active.write() = ActiveContext {
            profile,
            metadata: Arc::new(metadata),
        };
        Ok(())
    }

    async fn consume_topic(
        &self,
        topic: &str,
        flags: ConsumeFlags,
        cancel: CancellationToken,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), GatewayError> {
        let brokers = self.active.read().profile.brokers.clone();
        let consumer: Arc<StreamConsumer> = Arc::new(client_config(&brokers).create()?);

        let (assignment, mut end_offsets) = {
            let consumer = Arc::clone(&consumer);
            let topic = topic.to_string();
            let timeout = self.timeout;
            blocking(move || plan_assignment(&consumer, &topic, flags, timeout)).await?
        };
        consumer.assign(&assignment)?;
        info!(topic, policy = %flags.offset_policy, tail = flags.tail, follow = flags.follow, "consuming");

        if !flags.follow && end_offsets.is_empty() {
            return Ok(());
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(topic, "consumer cancelled");
                    return Ok(());
                }
                received = consumer.recv() => match received {
                    Ok(message) => {
                        let message = convert(&message);
                        if end_offsets
                            .get(&message.partition)
                            .is_some_and(|end| message.offset + 1 >= *end)
                        {
                            end_offsets.remove(&message.partition);
                        }
                        handler.on_message(message);
                        if !flags.follow && end_offsets.is_empty() {
                            return Ok(());
                        }
                    }
                    Err(KafkaError::PartitionEOF(_)) => {}
                    Err(KafkaError::MessageConsumption(code)) if is_transient(code) => {
                        handler.on_error(GatewayError::Consume(code.to_string()));
                    }
                    Err(e) => return Err(e.into()),
                },
            }
        }
    }
}

/// Builder for KafkaGateway.
#[derive(Debug, Default)]
pub struct KafkaGatewayBuilder {
    profiles: Vec<BrokerProfile>,
    current: Option<String>,
    timeout: Option<Duration>,
}

impl KafkaGatewayBuilder {
    /// Add a named broker profile (comma-separated bootstrap servers).
    pub fn profile(mut self, name: impl Into<String>, brokers: impl Into<String>) -> Self {
        self.profiles.push(BrokerProfile::new(name, brokers));
        self
    }

    /// Select the profile used at start-up (default: the first one).
    pub fn current(mut self, name: impl Into<String>) -> Self {
        self.current = Some(name.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the gateway and its metadata client.
    pub fn build(self) -> Result<KafkaGateway, GatewayError> {
        let mut profiles = self.profiles;
        if profiles.is_empty() {
            profiles.push(BrokerProfile::new("default", "localhost:9092"));
        }
        let profile = match self.current {
            Some(name) => profiles
                .iter()
                .find(|p| p.name == name)
                .cloned()
                .ok_or(GatewayError::UnknownContext(name))?,
            None => profiles[0].clone(),
        };
        let metadata: BaseConsumer = client_config(&profile.brokers).create()?;

        Ok(KafkaGateway {
            profiles,
            active: RwLock::new(ActiveContext {
                profile,
                metadata: Arc::new(metadata),
            }),
            timeout: self.timeout.unwrap_or(Duration::from_secs(10)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_profiles_in_order() {
        let builder = KafkaGateway::builder()
            .profile("local", "localhost:9092")
            .profile("staging", "b1:9092,b2:9092");
        assert_eq!(
            builder.profiles,
            vec![
                BrokerProfile::new("local", "localhost:9092"),
                BrokerProfile::new("staging", "b1:9092,b2:9092"),
            ]
        );
    }

    #[test]
    fn builder_stores_current_and_timeout() {
        let builder = KafkaGateway::builder()
            .current("staging")
            .timeout(Duration::from_secs(3));
        assert_eq!(builder.current.as_deref(), Some("staging"));
        assert_eq!(builder.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn build_rejects_unknown_current_profile() {
        let result = KafkaGateway::builder()
            .profile("local", "localhost:9092")
            .current("missing")
            .build();
        assert!(matches!(result, Err(GatewayError::UnknownContext(name)) if name == "missing"));
    }

    #[test]
    fn transient_codes_are_not_fatal() {
        assert!(is_transient(RDKafkaErrorCode::AllBrokersDown));
        assert!(!is_transient(RDKafkaErrorCode::UnknownTopicOrPartition));
    }
}
