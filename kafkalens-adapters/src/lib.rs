//! # kafkalens-adapters
//!
//! Cluster gateways for the kafkalens terminal UI.
//!
//! A [`Gateway`] lists cluster metadata (topics, contexts, consumer groups),
//! switches between configured contexts, and streams the messages of a topic
//! into a [`MessageHandler`] until its cancellation token fires.
//!
//! ## Supported Backends
//!
//! - **Kafka** (`kafka` feature) - librdkafka bindings via `rdkafka`
//! - **Memory** (always available) - an in-process cluster used by tests and
//!   the `--demo` mode of the TUI
//!
//! ## Quick Start (Memory)
//!
//! ```rust
//! use kafkalens_adapters::{Gateway, MemoryGateway};
//! use kafkalens_types::TopicMeta;
//!
//! # tokio_test::block_on(async {
//! let gateway = MemoryGateway::new("local");
//! gateway.add_topic("orders", TopicMeta::new(3, 1, 0));
//!
//! let topics = gateway.list_topics().await.unwrap();
//! assert!(topics.contains_key("orders"));
//! # });
//! ```

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use kafkalens_types::{ConsumeFlags, ConsumedMessage, GroupMeta, TopicMeta};
use tokio_util::sync::CancellationToken;

pub mod error;
pub mod memory;
pub mod wire;

#[cfg(feature = "kafka")]
pub mod kafka;

pub use error::GatewayError;
pub use memory::MemoryGateway;

#[cfg(feature = "kafka")]
pub use kafka::{BrokerProfile, KafkaGateway};

// Re-export types for convenience
pub use kafkalens_types::{MessageHeader, OffsetPolicy};

/// Receives messages from a running consumption.
///
/// Callbacks run on the consuming task and must not block.
pub trait MessageHandler: Send + Sync {
    /// A message was received.
    fn on_message(&self, message: ConsumedMessage);

    /// A non-fatal problem occurred; consumption continues.
    fn on_error(&self, error: GatewayError) {
        let _ = error;
    }
}

/// Access to one cluster and its configured contexts.
///
/// Every method may fail; none blocks the caller beyond issuing the request.
#[async_trait]
pub trait Gateway: Send + Sync + Debug {
    /// List topics with partition count, replication factor and message count.
    async fn list_topics(&self) -> Result<BTreeMap<String, TopicMeta>, GatewayError>;

    /// List configured context names.
    async fn list_contexts(&self) -> Result<Vec<String>, GatewayError>;

    /// List consumer groups with their state and member count.
    async fn list_consumer_groups(&self) -> Result<Vec<GroupMeta>, GatewayError>;

    /// Name of the context requests currently go to.
    fn current_context(&self) -> String;

    /// Point subsequent requests at another configured context.
    async fn set_context(&self, name: &str) -> Result<(), GatewayError>;

    /// Stream the messages of `topic` into `handler`.
    ///
    /// Runs until `cancel` fires (returns `Ok(())`), until the end of every
    /// partition is reached when `flags.follow` is false, or until a fatal
    /// transport error occurs.
    async fn consume_topic(
        &self,
        topic: &str,
        flags: ConsumeFlags,
        cancel: CancellationToken,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), GatewayError>;
}
