//! Cached views over cluster metadata, each refreshed by its own poller.
//!
//! A [`Resource`] is one of three variants. Only the active one polls:
//! switching stops the old poller before the new one starts fetching.

mod contexts;
mod groups;
mod poll;
mod topics;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use kafkalens_adapters::{Gateway, GatewayError};

use crate::supervisor::Recovery;
use crate::view::TableModel;

pub use contexts::{ContextCache, ContextResource};
pub use groups::GroupResource;
pub use poll::PollHandle;
pub use topics::TopicResource;

/// Default interval between two fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// The three categories of cluster metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Topics,
    Contexts,
    ConsumerGroups,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Topics, Self::Contexts, Self::ConsumerGroups];

    /// Names accepted by the resource search, matched case-sensitively.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Topics => &["topics", "ts"],
            Self::Contexts => &["context", "ctx", "kafka", "broker"],
            Self::ConsumerGroups => &["consumergroups", "groups", "consumers", "cgs"],
        }
    }

    pub fn from_alias(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.aliases().contains(&text))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Topics => "Topics",
            Self::Contexts => "Contexts",
            Self::ConsumerGroups => "ConsumerGroups",
        }
    }

    pub(crate) fn task_name(self) -> &'static str {
        match self {
            Self::Topics => "topic-poller",
            Self::Contexts => "context-poller",
            Self::ConsumerGroups => "group-poller",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Called after a poller stored fresh data.
pub type RefreshHook = Arc<dyn Fn(ResourceKind) + Send + Sync>;
/// Called when a fetch fails; the cache keeps its previous value.
pub type ErrorHook = Arc<dyn Fn(ResourceKind, GatewayError) + Send + Sync>;

/// Everything a resource needs from the outside, passed in at construction.
#[derive(Clone)]
pub struct ResourceHooks {
    pub gateway: Arc<dyn Gateway>,
    pub interval: Duration,
    pub on_refresh: RefreshHook,
    pub on_error: ErrorHook,
    pub recovery: Recovery,
}

impl ResourceHooks {
    /// Hooks that ignore refreshes and errors.
    pub fn new(gateway: Arc<dyn Gateway>, recovery: Recovery) -> Self {
        Self {
            gateway,
            interval: DEFAULT_POLL_INTERVAL,
            on_refresh: Arc::new(|_| {}),
            on_error: Arc::new(|_, _| {}),
            recovery,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn on_refresh(mut self, hook: impl Fn(ResourceKind) + Send + Sync + 'static) -> Self {
        self.on_refresh = Arc::new(hook);
        self
    }

    pub fn on_error(
        mut self,
        hook: impl Fn(ResourceKind, GatewayError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Arc::new(hook);
        self
    }
}

impl fmt::Debug for ResourceHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHooks")
            .field("gateway", &self.gateway)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// A cached, self-refreshing view over one kind of cluster metadata.
#[derive(Debug)]
pub enum Resource {
    Topics(TopicResource),
    Contexts(ContextResource),
    ConsumerGroups(GroupResource),
}

impl Resource {
    /// Create a resource of `kind`. Nothing is fetched until
    /// [`start_polling`](Self::start_polling).
    pub fn new(kind: ResourceKind, hooks: ResourceHooks) -> Self {
        match kind {
            ResourceKind::Topics => Self::Topics(TopicResource::new(hooks)),
            ResourceKind::Contexts => Self::Contexts(ContextResource::new(hooks)),
            ResourceKind::ConsumerGroups => Self::ConsumerGroups(GroupResource::new(hooks)),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Topics(_) => ResourceKind::Topics,
            Self::Contexts(_) => ResourceKind::Contexts,
            Self::ConsumerGroups(_) => ResourceKind::ConsumerGroups,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn start_polling(&mut self) {
        match self {
            Self::Topics(r) => r.start_polling(),
            Self::Contexts(r) => r.start_polling(),
            Self::ConsumerGroups(r) => r.start_polling(),
        }
    }

    /// Replace this resource with a polling resource of `kind`.
    ///
    /// The current poller is cancelled and the new one waits for it to exit
    /// before its first fetch.
    pub fn switch_to(&mut self, kind: ResourceKind, hooks: ResourceHooks) {
        let mut next = Resource::new(kind, hooks);
        next.poll_handle().inherit(self.poll_handle());
        *self = next;
        self.start_polling();
    }

    pub fn stop_polling(&mut self) {
        self.poll_handle().cancel();
    }

    pub fn is_polling(&self) -> bool {
        match self {
            Self::Topics(r) => r.poll.is_running(),
            Self::Contexts(r) => r.poll.is_running(),
            Self::ConsumerGroups(r) => r.poll.is_running(),
        }
    }

    /// Stop polling and wait until the loop has exited.
    pub async fn stop_and_wait(&mut self) {
        self.poll_handle().stop_and_wait().await;
    }

    /// Clear `table` and repaint it from the cache.
    pub fn render(&self, table: &mut TableModel, filter: &str) {
        match self {
            Self::Topics(r) => r.render(table, filter),
            Self::Contexts(r) => r.render(table, filter),
            Self::ConsumerGroups(r) => r.render(table, filter),
        }
    }

    fn poll_handle(&mut self) -> &mut PollHandle {
        match self {
            Self::Topics(r) => &mut r.poll,
            Self::Contexts(r) => &mut r.poll,
            Self::ConsumerGroups(r) => &mut r.poll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_case_sensitively() {
        assert_eq!(ResourceKind::from_alias("ts"), Some(ResourceKind::Topics));
        assert_eq!(ResourceKind::from_alias("broker"), Some(ResourceKind::Contexts));
        assert_eq!(ResourceKind::from_alias("cgs"), Some(ResourceKind::ConsumerGroups));
        assert_eq!(ResourceKind::from_alias("Topics"), None);
        assert_eq!(ResourceKind::from_alias("topic"), None);
    }

    #[test]
    fn aliases_are_unique() {
        let mut all: Vec<&str> = ResourceKind::ALL
            .iter()
            .flat_map(|k| k.aliases().iter().copied())
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }
}
