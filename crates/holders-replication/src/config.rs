use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a merge does when the document already holds an entry for the same
/// owner and source share.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayPolicy {
    /// Append regardless. Replaying an event duplicates its owner entry.
    #[default]
    Append,
    /// Skip the append and only refresh aggregates.
    Deduplicate,
}

impl fmt::Display for ReplayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Deduplicate => write!(f, "deduplicate"),
        }
    }
}

impl FromStr for ReplayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "deduplicate" | "dedupe" => Ok(Self::Deduplicate),
            other => Err(format!("unknown replay policy {other:?}")),
        }
    }
}

/// Replication settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationConfig {
    /// Replicate inline on the write path instead of through the channel.
    pub synchronous: bool,
    /// Owners registered anywhere else count as foreign.
    pub home_country: String,
    pub replay_policy: ReplayPolicy,
    /// Re-merge attempts after losing a version race, before giving up.
    pub max_conflict_retries: u32,
    /// Consume from this shared queue instead of a private broadcast queue.
    pub consumer_group: Option<String>,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            synchronous: true,
            home_country: "Norway".into(),
            replay_policy: ReplayPolicy::Append,
            max_conflict_retries: 5,
            consumer_group: None,
        }
    }
}
