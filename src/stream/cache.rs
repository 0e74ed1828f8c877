use std::collections::BTreeMap;

use kafkalens_types::ConsumedMessage;

/// Messages of one topic view keyed by (partition, offset).
///
/// A re-delivered position overwrites the stored message. The dirty flags
/// tell the refresh task whether a repaint is due.
#[derive(Debug, Default)]
pub struct MessageCache {
    entries: BTreeMap<(i32, i64), ConsumedMessage>,
    new_message_arrived: bool,
    force_refresh: bool,
}

impl MessageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, message: ConsumedMessage) {
        self.entries.insert(message.position(), message);
        self.new_message_arrived = true;
    }

    pub fn get(&self, partition: i32, offset: i64) -> Option<&ConsumedMessage> {
        self.entries.get(&(partition, offset))
    }

    /// Messages ordered by partition, then offset.
    pub fn messages(&self) -> impl Iterator<Item = &ConsumedMessage> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.new_message_arrived = false;
        self.force_refresh = true;
    }

    /// Request a repaint even if no message arrived.
    pub fn force_refresh(&mut self) {
        self.force_refresh = true;
    }

    /// Whether a repaint is due. Resets both flags.
    pub fn take_dirty(&mut self) -> bool {
        let dirty = self.new_message_arrived || self.force_refresh;
        self.new_message_arrived = false;
        self.force_refresh = false;
        dirty
    }
}
