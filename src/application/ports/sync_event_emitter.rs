use crate::domain::entities::SyncResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SyncEvent {
    DrainCompleted(SyncResult),
    PendingCountChanged(u32),
}

pub trait SyncEventEmitter: Send + Sync {
    fn emit(&self, event: &SyncEvent) -> Result<(), String>;
}
