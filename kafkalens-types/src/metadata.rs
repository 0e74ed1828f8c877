//! Cluster metadata listed by the gateway.

/// Summary of one topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopicMeta {
    /// Number of partitions.
    pub partitions: i32,
    /// Replication factor of the first partition.
    pub replication_factor: i32,
    /// Messages currently retained, summed over partitions (high - low watermark).
    pub message_count: i64,
}

impl TopicMeta {
    pub fn new(partitions: i32, replication_factor: i32, message_count: i64) -> Self {
        Self {
            partitions,
            replication_factor,
            message_count,
        }
    }
}

/// Summary of one consumer group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupMeta {
    /// Group id.
    pub name: String,
    /// Coordinator-reported state, e.g. `Stable` or `Empty`.
    pub state: String,
    /// Number of members currently in the group.
    pub consumers: usize,
}

impl GroupMeta {
    pub fn new(name: impl Into<String>, state: impl Into<String>, consumers: usize) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            consumers,
        }
    }
}
