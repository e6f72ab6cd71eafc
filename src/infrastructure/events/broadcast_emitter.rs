use crate::application::ports::{SyncEvent, SyncEventEmitter};
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// Fans sync events out to any number of in-process listeners.
#[derive(Clone)]
pub struct BroadcastSyncEmitter {
    sender: broadcast::Sender<SyncEvent>,
}

impl BroadcastSyncEmitter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastSyncEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncEventEmitter for BroadcastSyncEmitter {
    fn emit(&self, event: &SyncEvent) -> Result<(), String> {
        // Zero listeners is not an error; the UI may not be attached yet.
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender
            .send(event.clone())
            .map(|_| ())
            .map_err(|err| err.to_string())
    }
}
