//! Crash containment for background tasks.
//!
//! Every long-lived task (pollers, consumers, refresh tickers, the signal
//! dispatcher) is spawned through [`spawn_supervised`]. If the task panics,
//! the panic is caught at the task boundary and turned into a clean shutdown
//! request through the shared [`Recovery`] handle. The main loop watches
//! that handle and leaves the terminal in a sane state before exiting.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Shared shutdown trigger for fatal background failures.
#[derive(Debug, Clone, Default)]
pub struct Recovery {
    token: CancellationToken,
    reason: Arc<Mutex<Option<String>>>,
}

impl Recovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an application shutdown. The first reason is kept.
    pub fn trigger(&self, reason: impl Into<String>) {
        let reason = reason.into();
        error!(%reason, "fatal background failure, shutting down");
        let mut slot = self.reason.lock();
        if slot.is_none() {
            *slot = Some(reason);
        }
        drop(slot);
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn reason(&self) -> Option<String> {
        self.reason.lock().clone()
    }

    /// Token cancelled once recovery is triggered.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Spawn `future`, triggering `recovery` if it panics.
///
/// The returned handle completes once the task itself has finished.
pub fn spawn_supervised<F>(name: &'static str, recovery: Recovery, future: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let task = tokio::spawn(future);
    tokio::spawn(async move {
        match task.await {
            Ok(()) => {}
            Err(e) if e.is_panic() => {
                recovery.trigger(format!("{} task panicked: {}", name, panic_message(e.into_panic())));
            }
            Err(_) => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panic_triggers_recovery() {
        let recovery = Recovery::new();
        let handle = spawn_supervised("poller", recovery.clone(), async {
            panic!("boom");
        });
        handle.await.unwrap();
        assert!(recovery.is_triggered());
        assert_eq!(recovery.reason().unwrap(), "poller task panicked: boom");
    }

    #[tokio::test]
    async fn clean_exit_does_not_trigger() {
        let recovery = Recovery::new();
        spawn_supervised("refresh", recovery.clone(), async {}).await.unwrap();
        assert!(!recovery.is_triggered());
    }

    #[test]
    fn first_reason_wins() {
        let recovery = Recovery::new();
        recovery.trigger("first");
        recovery.trigger("second");
        assert_eq!(recovery.reason().as_deref(), Some("first"));
    }
}
