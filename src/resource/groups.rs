use std::collections::BTreeMap;
use std::sync::Arc;

use kafkalens_types::GroupMeta;
use parking_lot::Mutex;

use super::{PollHandle, ResourceHooks, ResourceKind};
use crate::view::{render_groups, TableModel};

/// Consumer group name to state and member count.
#[derive(Debug)]
pub struct GroupResource {
    cache: Arc<Mutex<BTreeMap<String, GroupMeta>>>,
    pub(super) poll: PollHandle,
    hooks: ResourceHooks,
}

impl GroupResource {
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
            ResourceKind::ConsumerGroups,
            &self.hooks,
            move || {
                let gateway = gateway.clone();
                async move { gateway.list_consumer_groups().await }
            },
            move |groups: Vec<GroupMeta>| {
                *cache.lock() = groups.into_iter().map(|g| (g.name.clone(), g)).collect();
            },
        );
    }

    pub fn render(&self, table: &mut TableModel, filter: &str) {
        render_groups(table, &self.cache.lock(), filter);
    }

    pub fn groups(&self) -> BTreeMap<String, GroupMeta> {
        self.cache.lock().clone()
    }
}
