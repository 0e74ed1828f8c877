#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kafkalens_adapters::{Gateway, GatewayError, MessageHandler};
use kafkalens_types::{ConsumeFlags, GroupMeta, TopicMeta};
use tokio_util::sync::CancellationToken;

/// Poll `condition` every 10ms (virtual time under a paused clock) until it
/// holds, panicking after `limit`.
pub async fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + limit;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within {:?}",
            limit
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Gateway whose listings take a while and record whether two of them ever
/// ran at the same time.
#[derive(Debug, Default)]
pub struct InstrumentedGateway {
    in_flight: AtomicBool,
    pub overlaps: AtomicUsize,
    pub fetches: AtomicUsize,
    pub failing: AtomicBool,
    consumers: AtomicUsize,
    max_consumers: AtomicUsize,
}

impl InstrumentedGateway {
    pub const FETCH_TIME: Duration = Duration::from_millis(40);

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    /// Consumers currently subscribed.
    pub fn consumers(&self) -> usize {
        self.consumers.load(Ordering::SeqCst)
    }

    /// Most consumers ever subscribed at once.
    pub fn max_consumers(&self) -> usize {
        self.max_consumers.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    async fn guarded<T>(&self, value: T) -> Result<T, GatewayError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Self::FETCH_TIME).await;
        self.in_flight.store(false, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Metadata(format!("fetch {} failed", n)));
        }
        Ok(value)
    }
}

#[async_trait]
impl Gateway for InstrumentedGateway {
    async fn list_topics(&self) -> Result<BTreeMap<String, TopicMeta>, GatewayError> {
        let mut topics = BTreeMap::new();
        topics.insert("orders".to_string(), TopicMeta::new(3, 1, 10));
        topics.insert("payments".to_string(), TopicMeta::new(1, 1, 2));
        self.guarded(topics).await
    }

    async fn list_contexts(&self) -> Result<Vec<String>, GatewayError> {
        self.guarded(vec!["local".to_string()]).await
    }

    async fn list_consumer_groups(&self) -> Result<Vec<GroupMeta>, GatewayError> {
        self.guarded(vec![GroupMeta::new("billing", "Stable", 2)]).await
    }

    fn current_context(&self) -> String {
        "local".to_string()
    }

    async fn set_context(&self, _name: &str) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn consume_topic(
        &self,
        _topic: &str,
        _flags: ConsumeFlags,
        cancel: CancellationToken,
        _handler: Arc<dyn MessageHandler>,
    ) -> Result<(), GatewayError> {
        let live = self.consumers.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_consumers.fetch_max(live, Ordering::SeqCst);
        cancel.cancelled().await;
        // unsubscribing takes a moment, like a real client closing
        tokio::time::sleep(Self::FETCH_TIME).await;
        self.consumers.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
