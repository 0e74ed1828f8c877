//! Cancellable background poll loops.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use kafkalens_adapters::GatewayError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{ResourceHooks, ResourceKind};
use crate::supervisor::spawn_supervised;

/// Owned cancellation token plus the task it controls.
///
/// Cancelling is idempotent and works before anything was started. Dropping
/// the handle cancels the loop.
#[derive(Default)]
pub struct PollHandle {
    token: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollHandle")
            .field("running", &self.is_running())
            .finish()
    }
}

impl PollHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a loop was started and not yet cancelled.
    pub fn is_running(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    pub fn cancel(&mut self) {
        if let Some(token) = &self.token {
            token.cancel();
        }
    }

    /// Cancel `other` and make its task the one the next loop started on
    /// this handle waits for.
    pub fn inherit(&mut self, other: &mut PollHandle) {
        other.cancel();
        if let Some(task) = other.task.take() {
            self.cancel();
            self.task = Some(task);
        }
    }

    /// Cancel and wait for the loop to exit.
    pub async fn stop_and_wait(&mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Start a loop that calls `fetch` every `hooks.interval` and hands each
    /// successful result to `store`.
    ///
    /// A previously started loop is cancelled first, and the new loop does
    /// not issue its first fetch until the old one has exited.
    pub(crate) fn start<T, F, Fut, S>(
        &mut self,
        kind: ResourceKind,
        hooks: &ResourceHooks,
        fetch: F,
        store: S,
    ) where
        T: Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, GatewayError>> + Send,
        S: Fn(T) + Send + 'static,
    {
        self.cancel();
        let previous = self.task.take();
        let token = CancellationToken::new();
        let interval = hooks.interval;
        let on_refresh = hooks.on_refresh.clone();
        let on_error = hooks.on_error.clone();
        let cancel = token.clone();

        let task = spawn_supervised(kind.task_name(), hooks.recovery.clone(), async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            debug!(resource = kind.name(), "poller started");
            let on_data = move |data| {
                store(data);
                on_refresh(kind);
            };
            run_loop(kind, interval, &cancel, fetch, on_data, |e| on_error(kind, e)).await;
            debug!(resource = kind.name(), "poller stopped");
        });

        self.token = Some(token);
        self.task = Some(task);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_loop<T, F, Fut>(
    kind: ResourceKind,
    interval: Duration,
    cancel: &CancellationToken,
    fetch: F,
    mut on_data: impl FnMut(T),
    mut on_error: impl FnMut(GatewayError),
) where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    loop {
        if cancel.is_cancelled() {
            break;
        }

        // An in-flight fetch is allowed to finish; its result is discarded
        // if the loop was cancelled meanwhile.
        match fetch().await {
            Ok(data) if !cancel.is_cancelled() => on_data(data),
            Ok(_) => break,
            Err(e) if cancel.is_cancelled() => {
                debug!(resource = kind.name(), error = %e, "fetch failed after cancel");
                break;
            }
            Err(e) => {
                warn!(resource = kind.name(), error = %e, "fetch failed, keeping cached data");
                on_error(e);
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
