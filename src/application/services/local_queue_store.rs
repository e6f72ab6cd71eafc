use crate::application::ports::{KeyValueStore, SyncEvent, SyncEventEmitter};
use crate::domain::entities::PendingInspectionEntry;
use crate::shared::error::AppError;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

pub const DEFAULT_QUEUE_KEY: &str = "pending_inspections";

/// Whole-queue persistence of pending inspections under one key.
///
/// There is no entry-level API: callers read the full sequence, change it and
/// write it back. `update` runs that cycle under an in-process lock.
pub struct LocalQueueStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    gate: Mutex<()>,
    event_emitter: Option<Arc<dyn SyncEventEmitter>>,
}

impl LocalQueueStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            gate: Mutex::new(()),
            event_emitter: None,
        }
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn SyncEventEmitter>) -> Self {
        self.event_emitter = Some(emitter);
        self
    }

    /// Reads the queue. Missing or unreadable data yields an empty queue.
    pub fn load(&self) -> Vec<PendingInspectionEntry> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(
                    target: "offline::queue",
                    key = %self.key,
                    error = %err,
                    "failed to read pending queue, treating as empty"
                );
                return Vec::new();
            }
        };

        let items = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(
                    target: "offline::queue",
                    key = %self.key,
                    error = %err,
                    "pending queue is corrupt, treating as empty"
                );
                return Vec::new();
            }
        };

        let total = items.len();
        let entries: Vec<PendingInspectionEntry> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        if entries.len() != total {
            tracing::warn!(
                target: "offline::queue",
                key = %self.key,
                dropped = total - entries.len(),
                "dropped unparsable pending entries"
            );
        }
        entries
    }

    /// Overwrites the stored queue with `entries`.
    pub fn save(&self, entries: &[PendingInspectionEntry]) -> Result<(), AppError> {
        let _guard = self.lock();
        self.write(entries)
    }

    /// Runs one load, mutate, save cycle and returns what `mutate` returned.
    pub fn update<F, R>(&self, mutate: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Vec<PendingInspectionEntry>) -> R,
    {
        let _guard = self.lock();
        let mut entries = self.load();
        let result = mutate(&mut entries);
        self.write(&entries)?;
        Ok(result)
    }

    pub fn append(&self, entry: PendingInspectionEntry) -> Result<usize, AppError> {
        self.update(|entries| {
            entries.push(entry);
            entries.len()
        })
    }

    pub fn pending_count(&self) -> usize {
        self.load().len()
    }

    fn write(&self, entries: &[PendingInspectionEntry]) -> Result<(), AppError> {
        let serialized = serde_json::to_string(entries)?;
        self.store.set(&self.key, &serialized).map_err(|err| {
            tracing::error!(
                target: "offline::queue",
                key = %self.key,
                error = %err,
                "failed to persist pending queue"
            );
            match err {
                AppError::Storage(_) => err,
                other => AppError::Storage(other.to_string()),
            }
        })?;
        self.notify_pending(entries.len());
        Ok(())
    }

    fn notify_pending(&self, count: usize) {
        if let Some(emitter) = &self.event_emitter
            && let Err(err) = emitter.emit(&SyncEvent::PendingCountChanged(count as u32))
        {
            tracing::warn!(
                target: "offline::queue",
                error = %err,
                "failed to emit pending count"
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PhotoSet;
    use crate::domain::value_objects::{EntryStatus, PhotoPayload, ValveCode};
    use crate::infrastructure::storage::MemoryKeyValueStore;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn entry(code: &str) -> PendingInspectionEntry {
        PendingInspectionEntry::new(
            ValveCode::new(code.into()).unwrap(),
            PhotoSet::new(Some(PhotoPayload::inline("image/jpeg", b"jpeg")), None, None),
        )
    }

    fn queue_with(store: Arc<dyn KeyValueStore>) -> LocalQueueStore {
        LocalQueueStore::new(store, DEFAULT_QUEUE_KEY)
    }

    /// Memory store whose writes fail on demand.
    #[derive(Default)]
    struct ReadOnlyStore {
        inner: MemoryKeyValueStore,
        read_only: AtomicBool,
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, AppError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
            if self.read_only.load(Ordering::SeqCst) {
                return Err(AppError::Internal("disk full".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), AppError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn absent_queue_loads_empty() {
        let queue = queue_with(Arc::new(MemoryKeyValueStore::new()));
        assert!(queue.load().is_empty());
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn corrupt_queue_loads_empty_and_is_overwritten() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(DEFAULT_QUEUE_KEY, "{not json").unwrap();
        let queue = queue_with(store.clone());

        assert!(queue.load().is_empty());

        let first = entry("VLV-1");
        queue.save(std::slice::from_ref(&first)).unwrap();
        assert_eq!(queue.load(), vec![first]);
    }

    #[test]
    fn unparsable_entries_are_dropped_individually() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let good = entry("VLV-2");
        let raw = format!(
            "[{}, {{\"id\": \"x\", \"valveCode\": \"\"}}]",
            serde_json::to_string(&good).unwrap()
        );
        store.set(DEFAULT_QUEUE_KEY, &raw).unwrap();

        let loaded = queue_with(store).load();
        assert_eq!(loaded, vec![good]);
    }

    #[test]
    fn long_valve_codes_survive_a_reload() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let long_code = "V".repeat(65);
        let raw = serde_json::json!([{
            "id": "1767225600000-abcdefghi",
            "valveCode": long_code,
            "photoInitial": null,
            "photoDuring": null,
            "photoFinal": null,
            "createdAt": 1_767_225_600_000_i64,
            "status": "pending"
        }])
        .to_string();
        store.set(DEFAULT_QUEUE_KEY, &raw).unwrap();

        let loaded = queue_with(store).load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].valve_code.as_str(), long_code);
        assert_eq!(loaded[0].status, EntryStatus::Pending);
    }

    #[test]
    fn failed_write_reports_storage_error_and_keeps_queue() {
        let store = Arc::new(ReadOnlyStore::default());
        let queue = queue_with(store.clone());
        let first = entry("VLV-1");
        queue.append(first.clone()).unwrap();

        store.read_only.store(true, Ordering::SeqCst);
        let err = queue.append(entry("VLV-2")).unwrap_err();

        assert!(matches!(err, AppError::Storage(_)), "{err:?}");
        assert_eq!(queue.load(), vec![first]);
    }

    #[test]
    fn update_persists_mutation_in_order() {
        let queue = queue_with(Arc::new(MemoryKeyValueStore::new()));
        queue.append(entry("VLV-1")).unwrap();
        queue.append(entry("VLV-2")).unwrap();

        queue
            .update(|entries| entries[0].status = EntryStatus::Failed)
            .unwrap();

        let loaded = queue.load();
        let codes: Vec<_> = loaded.iter().map(|e| e.valve_code.as_str()).collect();
        assert_eq!(codes, vec!["VLV-1", "VLV-2"]);
        assert_eq!(loaded[0].status, EntryStatus::Failed);
        assert_eq!(loaded[1].status, EntryStatus::Pending);
    }
}
