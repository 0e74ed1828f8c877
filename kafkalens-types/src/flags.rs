//! Consumption flags for a topic view.

use core::fmt;

/// Tail count used when consuming from the latest offsets.
pub const DEFAULT_LATEST_TAIL: i32 = 50;

/// Tail count used when consuming from the earliest offsets.
pub const DEFAULT_EARLIEST_TAIL: i32 = 0;

/// Where a topic view starts consuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OffsetPolicy {
    /// Start from the oldest retained message of every partition.
    Earliest,
    /// Start near the end of every partition, `tail` messages back.
    #[default]
    Latest,
}

impl OffsetPolicy {
    /// The other policy.
    pub fn toggled(self) -> Self {
        match self {
            OffsetPolicy::Earliest => OffsetPolicy::Latest,
            OffsetPolicy::Latest => OffsetPolicy::Earliest,
        }
    }

    /// Tail count a fresh toggle into this policy starts with.
    pub fn default_tail(self) -> i32 {
        match self {
            OffsetPolicy::Earliest => DEFAULT_EARLIEST_TAIL,
            OffsetPolicy::Latest => DEFAULT_LATEST_TAIL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OffsetPolicy::Earliest => "earliest",
            OffsetPolicy::Latest => "latest",
        }
    }
}

impl fmt::Display for OffsetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OffsetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earliest" | "oldest" | "beginning" => Ok(OffsetPolicy::Earliest),
            "latest" | "newest" | "end" => Ok(OffsetPolicy::Latest),
            other => Err(format!("unknown offset policy: {}", other)),
        }
    }
}

/// Flags passed to the gateway when a topic view starts consuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumeFlags {
    /// Where consumption starts.
    pub offset_policy: OffsetPolicy,
    /// How many messages before the end of each partition to start at.
    ///
    /// Only meaningful for [`OffsetPolicy::Latest`].
    pub tail: i32,
    /// Keep consuming after the current end of the partitions is reached.
    pub follow: bool,
}

impl ConsumeFlags {
    pub fn new(offset_policy: OffsetPolicy, tail: i32, follow: bool) -> Self {
        Self {
            offset_policy,
            tail,
            follow,
        }
    }

    /// Flip the offset policy and reset the tail to the new policy's default.
    pub fn toggle_offset_policy(&mut self) {
        self.offset_policy = self.offset_policy.toggled();
        self.tail = self.offset_policy.default_tail();
    }

    /// Copy of these flags with the offset policy toggled.
    pub fn toggled_offset_policy(mut self) -> Self {
        self.toggle_offset_policy();
        self
    }
}

impl Default for ConsumeFlags {
    fn default() -> Self {
        Self::new(OffsetPolicy::Latest, DEFAULT_LATEST_TAIL, true)
    }
}
