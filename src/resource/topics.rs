use std::collections::BTreeMap;
use std::sync::Arc;

use kafkalens_types::TopicMeta;
use parking_lot::Mutex;

use super::{PollHandle, ResourceHooks, ResourceKind};
use crate::view::{render_topics, TableModel};

/// Topic name to partition count, replication factor and message count.
#[derive(Debug)]
pub struct TopicResource {
    cache: Arc<Mutex<BTreeMap<String, TopicMeta>>>,
    pub(super) poll: PollHandle,
    hooks: ResourceHooks,
}

impl TopicResource {
    pub fn new(hooks: ResourceHooks) -> Self {
        Self {
            cache: Arc::default(),
            poll: PollHandle::new(),
            hooks,
        }
    }

    pub fn start_polling(&mut self) {
        let gateway = self.hooks.gateway.clone();
        let cache = self.cache.clone();
        self.poll.start(
            ResourceKind::Topics,
            &self.hooks,
            move || {
                let gateway = gateway.clone();
                async move { gateway.list_topics().await }
            },
            move |topics| *cache.lock() = topics,
        );
    }

    pub fn render(&self, table: &mut TableModel, filter: &str) {
        render_topics(table, &self.cache.lock(), filter);
    }

    pub fn topics(&self) -> BTreeMap<String, TopicMeta> {
        self.cache.lock().clone()
    }
}
