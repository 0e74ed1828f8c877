//! UI-thread marshaling.
//!
//! Background tasks never touch UI state. They either post a closure onto
//! the [`UiQueue`], which the main loop drains between frames, or send a
//! [`UiEvent`] that the signal dispatcher turns into such a closure.

use std::fmt;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::supervisor::{spawn_supervised, Recovery};

/// Work to run on the UI thread against state `S`.
pub type UiTask<S> = Box<dyn FnOnce(&mut S) + Send>;

/// Sending half of the run-on-UI-thread queue.
pub struct UiQueue<S> {
    tx: mpsc::UnboundedSender<UiTask<S>>,
}

impl<S> Clone for UiQueue<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> fmt::Debug for UiQueue<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiQueue").field("closed", &self.tx.is_closed()).finish()
    }
}

impl<S: 'static> UiQueue<S> {
    /// Create a queue and the receiver the UI thread drains.
    pub fn channel() -> (Self, UiQueueReceiver<S>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, UiQueueReceiver { rx })
    }

    /// Queue `task`. Returns false once the UI has shut down.
    pub fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.tx.send(Box::new(task)).is_ok()
    }
}

/// Receiving half, owned by the UI thread.
pub struct UiQueueReceiver<S> {
    rx: mpsc::UnboundedReceiver<UiTask<S>>,
}

impl<S> UiQueueReceiver<S> {
    /// Run every queued task in order. Never blocks.
    pub fn drain(&mut self, state: &mut S) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(state);
            ran += 1;
        }
        ran
    }
}

/// Signals that change UI mode. Delivered in send order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Close the visible modal.
    ModalClose,
    /// Focus the search input in resource-search mode.
    FocusSearch,
    /// Focus the search input in table-search mode.
    StartTableSearch,
    /// The visible page changed.
    PageChange,
}

/// State that reacts to [`UiEvent`]s.
pub trait SignalTarget {
    fn apply_signal(&mut self, event: UiEvent);
}

/// Producer side of the signal queue. Sending never blocks and never drops.
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl SignalSender {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            debug!(?event, "signal dispatcher gone, dropping event");
        }
    }
}

/// Forward signals onto the UI queue until every sender is dropped.
pub fn spawn_signal_dispatcher<S>(
    mut rx: mpsc::UnboundedReceiver<UiEvent>,
    ui: UiQueue<S>,
    recovery: Recovery,
) -> JoinHandle<()>
where
    S: SignalTarget + 'static,
{
    spawn_supervised("signal-dispatcher", recovery, async move {
        while let Some(event) = rx.recv().await {
            if !ui.post(move |state: &mut S| state.apply_signal(event)) {
                break;
            }
        }
        debug!("signal dispatcher stopped");
    })
}
