//! A message received from a topic.

/// A single record header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageHeader {
    pub key: String,
    pub value: String,
}

impl MessageHeader {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A message consumed from a topic partition.
///
/// Messages are immutable once received; the TUI deduplicates them by
/// [`ConsumedMessage::position`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumedMessage {
    /// Message key, decoded as lossy UTF-8.
    pub key: String,

    /// Message value, decoded as lossy UTF-8.
    pub value: String,

    /// Offset within the partition.
    pub offset: i64,

    /// Partition the message was read from.
    pub partition: i32,

    /// Schema registry id of the key, when the key uses the registry wire format.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub key_schema_id: Option<i32>,

    /// Schema registry id of the value, when the value uses the registry wire format.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub value_schema_id: Option<i32>,

    /// Record headers in broker order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub headers: Vec<MessageHeader>,

    /// Broker or producer timestamp in milliseconds since the epoch.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub timestamp_ms: Option<i64>,
}

impl ConsumedMessage {
    /// Start building a message at the given partition and offset.
    pub fn builder(partition: i32, offset: i64) -> ConsumedMessageBuilder {
        ConsumedMessageBuilder::new(partition, offset)
    }

    /// The `(partition, offset)` pair identifying this message within its topic.
    pub fn position(&self) -> (i32, i64) {
        (self.partition, self.offset)
    }
}

/// Builder for [`ConsumedMessage`].
#[derive(Debug)]
pub struct ConsumedMessageBuilder {
    message: ConsumedMessage,
}

impl ConsumedMessageBuilder {
    pub fn new(partition: i32, offset: i64) -> Self {
        Self {
            message: ConsumedMessage {
                partition,
                offset,
                ..ConsumedMessage::default()
            },
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.message.key = key.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.message.value = value.into();
        self
    }

    pub fn key_schema_id(mut self, id: i32) -> Self {
        self.message.key_schema_id = Some(id);
        self
    }

    pub fn value_schema_id(mut self, id: i32) -> Self {
        self.message.value_schema_id = Some(id);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.message.headers.push(MessageHeader::new(key, value));
        self
    }

    pub fn timestamp_ms(mut self, ts: i64) -> Self {
        self.message.timestamp_ms = Some(ts);
        self
    }

    pub fn build(self) -> ConsumedMessage {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let msg = ConsumedMessage::builder(3, 1200)
            .key("order-1")
            .value("payload")
            .value_schema_id(17)
            .header("trace-id", "abc")
            .timestamp_ms(1_703_160_000_000)
            .build();

        assert_eq!(msg.position(), (3, 1200));
        assert_eq!(msg.key, "order-1");
        assert_eq!(msg.key_schema_id, None);
        assert_eq!(msg.value_schema_id, Some(17));
        assert_eq!(msg.headers, vec![MessageHeader::new("trace-id", "abc")]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_skips_missing_schema_ids() {
        let msg = ConsumedMessage::builder(0, 1).value("v").build();
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("key_schema_id").is_none());
        assert_eq!(json["value"], "v");
    }
}
