//! Transient status line.
//!
//! One owner for the notification text: a new notification replaces the
//! previous one together with its expiry, so an older message can never
//! clear a newer one.

use std::time::{Duration, Instant};

pub const DEFAULT_NOTIFICATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
struct Notification {
    text: String,
    shown_at: Instant,
    duration: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    current: Option<Notification>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` for roughly `duration`, replacing any pending notification.
    pub fn notify(&mut self, text: impl Into<String>, duration: Duration) {
        self.current = Some(Notification {
            text: text.into(),
            shown_at: Instant::now(),
            duration,
        });
    }

    /// The visible notification, if it hasn't expired.
    pub fn current(&self) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|n| n.shown_at.elapsed() < n.duration)
            .map(|n| n.text.as_str())
    }

    /// The last notification text regardless of expiry.
    pub fn last(&self) -> Option<&str> {
        self.current.as_ref().map(|n| n.text.as_str())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
