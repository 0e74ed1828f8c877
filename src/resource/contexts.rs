use std::collections::BTreeSet;
use std::sync::Arc;

use kafkalens_adapters::GatewayError;
use parking_lot::Mutex;

use super::{PollHandle, ResourceHooks, ResourceKind};
use crate::view::{render_contexts, TableModel};

/// Configured context names and the one currently in use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextCache {
    pub names: BTreeSet<String>,
    pub current: String,
}

#[derive(Debug)]
pub struct ContextResource {
    cache: Arc<Mutex<ContextCache>>,
    pub(super) poll: PollHandle,
    hooks: ResourceHooks,
}

impl ContextResource {
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
            ResourceKind::Contexts,
            &self.hooks,
            move || {
                let gateway = gateway.clone();
                async move {
                    let names = gateway.list_contexts().await?;
                    Ok::<_, GatewayError>(ContextCache {
                        names: names.into_iter().collect(),
                        current: gateway.current_context(),
                    })
                }
            },
            move |contexts| *cache.lock() = contexts,
        );
    }

    pub fn render(&self, table: &mut TableModel, filter: &str) {
        let cache = self.cache.lock();
        render_contexts(table, &cache.names, &cache.current, filter);
    }

    pub fn contexts(&self) -> ContextCache {
        self.cache.lock().clone()
    }
}
