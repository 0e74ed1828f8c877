//! System clipboard access behind a trait so the copy action can be tested.

use anyhow::{anyhow, Result};

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard. Opened on first use so a missing display only
/// fails the copy, not startup.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| anyhow!("clipboard unavailable: {}", e))?;
            self.inner = Some(clipboard);
        }
        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_owned())
                .map_err(|e| anyhow!("copy failed: {}", e)),
            None => Err(anyhow!("clipboard unavailable")),
        }
    }
}

/// In-memory clipboard that remembers the last copied text.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}
