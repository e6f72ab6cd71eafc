use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SyncResult {
    pub synced_count: u32,
    pub failed_count: u32,
    pub pending_count: u32,
}

impl SyncResult {
    pub fn new(synced_count: u32, failed_count: u32, pending_count: u32) -> Self {
        Self {
            synced_count,
            failed_count,
            pending_count,
        }
    }

    /// One-line summary for a toast style notification.
    pub fn summary(&self) -> String {
        match (self.synced_count, self.failed_count) {
            (0, 0) => "Nothing to sync".to_string(),
            (synced, 0) => format!("{synced} synced"),
            (0, failed) => format!("{failed} failed, will retry"),
            (synced, failed) => format!("{synced} synced, {failed} failed, will retry"),
        }
    }
}

/// What a drain request did.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DrainOutcome {
    Completed(SyncResult),
    NothingToSync,
    AlreadyDraining,
    CoolingDown,
}

impl DrainOutcome {
    pub fn result(&self) -> Option<&SyncResult> {
        match self {
            DrainOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn was_skipped(&self) -> bool {
        matches!(
            self,
            DrainOutcome::AlreadyDraining | DrainOutcome::CoolingDown
        )
    }
}
