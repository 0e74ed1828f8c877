//! Live message pipeline behind a topic page.
//!
//! Two tasks run per session. The consume task feeds messages into a
//! [`MessageCache`] keyed by position. The refresh task wakes on a fixed
//! tick, and only when the cache changed (or the filter did) builds the
//! table rows and hands them to the UI. Ingestion never waits on drawing.
//!
//! ```text
//! gateway ──▶ CacheWriter ──▶ MessageCache ◀── refresh tick ──▶ on_rows ──▶ UI queue
//! ```

mod cache;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use kafkalens_adapters::{Gateway, GatewayError, MessageHandler};
use kafkalens_types::{ConsumeFlags, ConsumedMessage};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::supervisor::{spawn_supervised, Recovery};
use crate::view::render::message_rows;
use crate::view::MessageRows;

pub use cache::MessageCache;

/// Default repaint tick.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Receives freshly built rows on the refresh task.
pub type RowsHook = Arc<dyn Fn(MessageRows) + Send + Sync>;

#[derive(Clone)]
pub struct StreamHooks {
    pub gateway: Arc<dyn Gateway>,
    pub refresh_interval: Duration,
    pub on_rows: RowsHook,
    pub recovery: Recovery,
}

impl StreamHooks {
    pub fn new(gateway: Arc<dyn Gateway>, recovery: Recovery) -> Self {
        Self {
            gateway,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            on_rows: Arc::new(|_| {}),
            recovery,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn on_rows(mut self, hook: impl Fn(MessageRows) + Send + Sync + 'static) -> Self {
        self.on_rows = Arc::new(hook);
        self
    }
}

impl fmt::Debug for StreamHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHooks")
            .field("gateway", &self.gateway)
            .field("refresh_interval", &self.refresh_interval)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Idle,
    Consuming,
    Restarting,
    Cancelled,
}

#[derive(Debug, Default)]
struct Shared {
    cache: MessageCache,
    filter: String,
}

/// Writes consumed messages into the session's cache.
struct CacheWriter {
    topic: String,
    shared: Arc<Mutex<Shared>>,
    cancel: CancellationToken,
}

impl MessageHandler for CacheWriter {
    fn on_message(&self, message: ConsumedMessage) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.shared.lock().cache.insert(message);
    }

    fn on_error(&self, error: GatewayError) {
        warn!(topic = %self.topic, %error, "consumer reported an error");
    }
}

/// The consume and refresh tasks of one topic page.
pub struct TopicStream {
    topic: String,
    flags: ConsumeFlags,
    phase: StreamPhase,
    session: u64,
    shared: Arc<Mutex<Shared>>,
    token: Option<CancellationToken>,
    tasks: Vec<JoinHandle<()>>,
    hooks: StreamHooks,
}

impl fmt::Debug for TopicStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicStream")
            .field("topic", &self.topic)
            .field("flags", &self.flags)
            .field("phase", &self.phase)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl TopicStream {
    pub fn new(topic: impl Into<String>, flags: ConsumeFlags, hooks: StreamHooks) -> Self {
        Self {
            topic: topic.into(),
            flags,
            phase: StreamPhase::Idle,
            session: 0,
            shared: Arc::default(),
            token: None,
            tasks: Vec::new(),
            hooks,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn flags(&self) -> ConsumeFlags {
        self.flags
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// Identifies the running session. Rows from older sessions are stale.
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn filter(&self) -> String {
        self.shared.lock().filter.clone()
    }

    pub fn message_count(&self) -> usize {
        self.shared.lock().cache.len()
    }

    pub fn message(&self, partition: i32, offset: i64) -> Option<ConsumedMessage> {
        self.shared.lock().cache.get(partition, offset).cloned()
    }

    /// Start consuming with an empty cache.
    ///
    /// Any running session is cancelled first, and the new consumer does not
    /// subscribe until the old session's tasks have exited.
    pub fn consume(&mut self) {
        self.cancel_tasks();
        let previous = std::mem::take(&mut self.tasks);
        self.session += 1;
        self.shared = Arc::new(Mutex::new(Shared::default()));
        self.shared.lock().cache.force_refresh();

        let token = CancellationToken::new();
        info!(topic = %self.topic, session = self.session, flags = ?self.flags, "consuming topic");

        let consume = self.spawn_consumer(token.clone(), previous);
        let refresh = self.spawn_refresher(token.clone());
        self.token = Some(token);
        self.tasks = vec![consume, refresh];
        self.phase = StreamPhase::Consuming;
    }

    /// Replace the live filter and repaint on the next tick.
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        let mut shared = self.shared.lock();
        shared.filter = filter.into();
        shared.cache.force_refresh();
    }

    /// Stop both tasks, drop cached messages and the filter, then start
    /// again with `flags`.
    pub fn restart_consumer(&mut self, flags: ConsumeFlags) {
        self.phase = StreamPhase::Restarting;
        info!(topic = %self.topic, "restarting consumer");
        self.cancel_tasks();
        {
            let mut shared = self.shared.lock();
            shared.cache.clear();
            shared.filter.clear();
        }
        self.flags = flags;
        self.consume();
    }

    /// Flip between earliest and latest and restart.
    pub fn toggle_offset_policy(&mut self) {
        let flags = self.flags.toggled_offset_policy();
        self.restart_consumer(flags);
    }

    /// Stop both tasks. Clearing happens on a background task so closing
    /// the page never waits on the consumer.
    pub fn close(&mut self) -> JoinHandle<()> {
        self.cancel_tasks();
        self.phase = StreamPhase::Cancelled;
        let tasks = std::mem::take(&mut self.tasks);
        let shared = std::mem::take(&mut self.shared);
        let topic = self.topic.clone();
        tokio::spawn(async move {
            for task in tasks {
                let _ = task.await;
            }
            let mut shared = shared.lock();
            shared.cache.clear();
            shared.filter.clear();
            debug!(%topic, "topic page closed");
        })
    }

    /// Cancel and wait for both tasks to exit.
    pub async fn stop_and_wait(&mut self) {
        self.cancel_tasks();
        self.phase = StreamPhase::Cancelled;
        for task in std::mem::take(&mut self.tasks) {
            let _ = task.await;
        }
    }

    fn cancel_tasks(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    fn spawn_consumer(
        &self,
        cancel: CancellationToken,
        previous: Vec<JoinHandle<()>>,
    ) -> JoinHandle<()> {
        let gateway = self.hooks.gateway.clone();
        let recovery = self.hooks.recovery.clone();
        let topic = self.topic.clone();
        let flags = self.flags;
        let handler: Arc<dyn MessageHandler> = Arc::new(CacheWriter {
            topic: topic.clone(),
            shared: self.shared.clone(),
            cancel: cancel.clone(),
        });

        spawn_supervised("topic-consumer", self.hooks.recovery.clone(), async move {
            for task in previous {
                let _ = task.await;
            }
            if cancel.is_cancelled() {
                return;
            }
            match gateway.consume_topic(&topic, flags, cancel.clone(), handler).await {
                Ok(()) => debug!(%topic, "consumer finished"),
                Err(e) if cancel.is_cancelled() => debug!(%topic, error = %e, "consumer cancelled"),
                Err(e) => {
                    error!(%topic, error = %e, "consumer failed");
                    recovery.trigger(format!("consuming topic {}: {}", topic, e));
                }
            }
        })
    }

    fn spawn_refresher(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let shared = self.shared.clone();
        let session = self.session;
        let interval = self.hooks.refresh_interval;
        let on_rows = self.hooks.on_rows.clone();

        spawn_supervised("topic-refresh", self.hooks.recovery.clone(), async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let rows = {
                    let mut shared = shared.lock();
                    if !shared.cache.take_dirty() {
                        continue;
                    }
                    MessageRows {
                        session,
                        rows: message_rows(shared.cache.messages(), &shared.filter),
                        total: shared.cache.len(),
                    }
                };
                on_rows(rows);
            }
        })
    }
}

impl Drop for TopicStream {
    fn drop(&mut self) {
        self.cancel_tasks();
    }
}
