#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use valve_inspection_lib::domain::entities::{InspectionRecordUpdate, NewInspectionRecord};
use valve_inspection_lib::{
    AppError, BroadcastSyncEmitter, ConnectionPool, ConnectivityMonitor, FileKeyValueStore,
    FsBlobStore, InspectionFilter, InspectionId, InspectionRecord, InspectionRepository,
    InspectionSubmission, KeyValueStore, LocalQueueStore, PageRequest, PhotoPayload, PhotoSet,
    PhotoUploader, SortOrder, SqliteInspectionRepository, SubmissionRouter, SyncEngine,
    SyncEngineOptions, SyncEventEmitter, ValveCode,
};

pub const QUEUE_KEY: &str = "pending_inspections";
pub const PUBLIC_BASE_URL: &str = "https://cdn.test/inspection-photos";

/// Delegates to a real repository, failing inserts for selected valve codes.
pub struct FlakyRepository {
    inner: Arc<dyn InspectionRepository>,
    failing: Mutex<HashSet<String>>,
    insert_calls: AtomicUsize,
}

impl FlakyRepository {
    pub fn new(inner: Arc<dyn InspectionRepository>) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            insert_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_for(&self, valve_code: &str) {
        self.failing.lock().unwrap().insert(valve_code.to_string());
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InspectionRepository for FlakyRepository {
    async fn insert(&self, record: NewInspectionRecord) -> Result<InspectionRecord, AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .failing
            .lock()
            .unwrap()
            .contains(record.valve_code.as_str())
        {
            return Err(AppError::Network("simulated outage".into()));
        }
        self.inner.insert(record).await
    }

    async fn update(
        &self,
        id: &InspectionId,
        update: InspectionRecordUpdate,
    ) -> Result<InspectionRecord, AppError> {
        self.inner.update(id, update).await
    }

    async fn delete(&self, id: &InspectionId) -> Result<(), AppError> {
        self.inner.delete(id).await
    }

    async fn get(&self, id: &InspectionId) -> Result<Option<InspectionRecord>, AppError> {
        self.inner.get(id).await
    }

    async fn list(
        &self,
        filter: &InspectionFilter,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Vec<InspectionRecord>, AppError> {
        self.inner.list(filter, order, page).await
    }

    async fn count(&self, filter: &InspectionFilter) -> Result<u64, AppError> {
        self.inner.count(filter).await
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub key_value: Arc<FileKeyValueStore>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub queue: Arc<LocalQueueStore>,
    pub repository: Arc<FlakyRepository>,
    pub engine: Arc<SyncEngine>,
    pub router: SubmissionRouter,
    pub events: BroadcastSyncEmitter,
}

impl Harness {
    pub async fn new(online: bool, cooldown: Duration) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");

        let pool = ConnectionPool::from_memory().await.expect("in-memory sqlite");
        let sqlite = SqliteInspectionRepository::new(pool);
        sqlite.initialize().await.expect("migrations");
        let repository = Arc::new(FlakyRepository::new(Arc::new(sqlite)));

        let key_value = Arc::new(FileKeyValueStore::new(dir.path().join("kv")).expect("kv dir"));
        let blob_store = Arc::new(
            FsBlobStore::new(dir.path().join("blobs"), PUBLIC_BASE_URL).expect("blob dir"),
        );

        let events = BroadcastSyncEmitter::new();
        let emitter: Arc<dyn SyncEventEmitter> = Arc::new(events.clone());
        let monitor = Arc::new(ConnectivityMonitor::new(online));
        let queue = Arc::new(
            LocalQueueStore::new(key_value.clone() as Arc<dyn KeyValueStore>, QUEUE_KEY)
                .with_emitter(emitter.clone()),
        );
        let uploader = Arc::new(PhotoUploader::new(blob_store));
        let engine = Arc::new(
            SyncEngine::new(
                queue.clone(),
                uploader.clone(),
                repository.clone(),
                SyncEngineOptions {
                    cooldown,
                    call_timeout: Some(Duration::from_secs(5)),
                },
            )
            .with_emitter(emitter),
        );
        let router = SubmissionRouter::new(monitor.clone(), queue.clone(), uploader, repository.clone());

        Self {
            dir,
            key_value,
            monitor,
            queue,
            repository,
            engine,
            router,
            events,
        }
    }

    pub async fn remote_records(&self) -> Vec<InspectionRecord> {
        self.repository
            .list(
                &InspectionFilter::default(),
                SortOrder::Ascending,
                PageRequest::default(),
            )
            .await
            .expect("list records")
    }

    pub fn stored_blob_count(&self) -> usize {
        let photos = self.dir.path().join("blobs").join("inspections");
        std::fs::read_dir(photos)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

pub fn jpeg() -> Option<PhotoPayload> {
    Some(PhotoPayload::inline("image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0]))
}

pub fn submission(valve_code: &str, photos: PhotoSet) -> InspectionSubmission {
    InspectionSubmission::new(ValveCode::new(valve_code.to_string()).expect("valve code"), photos)
}
