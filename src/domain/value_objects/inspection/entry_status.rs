use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a queued inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Pending,
    Syncing,
    Synced,
    Failed,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Syncing => "syncing",
            EntryStatus::Synced => "synced",
            EntryStatus::Failed => "failed",
        }
    }

    /// Entries in these states may start a new sync attempt.
    pub fn is_eligible_for_sync(&self) -> bool {
        matches!(self, EntryStatus::Pending | EntryStatus::Failed)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
