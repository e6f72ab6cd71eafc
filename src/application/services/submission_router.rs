use super::connectivity_monitor::ConnectivityMonitor;
use super::local_queue_store::LocalQueueStore;
use super::photo_uploader::PhotoUploader;
use crate::application::ports::InspectionRepository;
use crate::domain::entities::{
    InspectionRecord, InspectionRecordUpdate, InspectionSubmission, NewInspectionRecord,
    PendingInspectionEntry,
};
use crate::domain::value_objects::{InspectionId, PendingEntryId};
use crate::shared::error::AppError;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Saved(InspectionRecord),
    Updated(InspectionRecord),
    Queued(PendingEntryId),
}

/// Sends a finalized submission to the remote store when online, to the
/// local queue otherwise.
pub struct SubmissionRouter {
    monitor: Arc<ConnectivityMonitor>,
    queue: Arc<LocalQueueStore>,
    uploader: Arc<PhotoUploader>,
    repository: Arc<dyn InspectionRepository>,
    call_timeout: Option<Duration>,
}

impl SubmissionRouter {
    pub fn new(
        monitor: Arc<ConnectivityMonitor>,
        queue: Arc<LocalQueueStore>,
        uploader: Arc<PhotoUploader>,
        repository: Arc<dyn InspectionRepository>,
    ) -> Self {
        Self {
            monitor,
            queue,
            uploader,
            repository,
            call_timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub async fn submit(
        &self,
        submission: InspectionSubmission,
        editing_id: Option<InspectionId>,
    ) -> Result<SubmissionOutcome, AppError> {
        if !self.monitor.is_online() {
            if let Some(id) = editing_id {
                tracing::info!(
                    target: "offline::router",
                    record_id = %id,
                    "edit rejected while offline"
                );
                return Err(AppError::Offline(
                    "Existing inspections can only be edited while online".to_string(),
                ));
            }
            return self.enqueue(submission).map(SubmissionOutcome::Queued);
        }

        match editing_id {
            Some(id) => self.update(&id, submission).await.map(SubmissionOutcome::Updated),
            None => self.insert(submission).await.map(SubmissionOutcome::Saved),
        }
    }

    fn enqueue(&self, submission: InspectionSubmission) -> Result<PendingEntryId, AppError> {
        let entry = PendingInspectionEntry::new(submission.valve_code, submission.photos);
        let id = entry.id.clone();
        let pending = self.queue.append(entry)?;
        tracing::info!(
            target: "offline::router",
            entry_id = %id,
            pending,
            "inspection queued for later sync"
        );
        Ok(id)
    }

    async fn insert(&self, submission: InspectionSubmission) -> Result<InspectionRecord, AppError> {
        let urls = self.uploader.upload_all(&submission.photos).await;
        let record = NewInspectionRecord::from_uploads(submission.valve_code, urls);
        let saved = self.bounded(self.repository.insert(record)).await?;
        tracing::info!(
            target: "offline::router",
            record_id = %saved.id,
            status = %saved.status,
            "inspection saved"
        );
        Ok(saved)
    }

    async fn update(
        &self,
        id: &InspectionId,
        submission: InspectionSubmission,
    ) -> Result<InspectionRecord, AppError> {
        let existing = self
            .bounded(self.repository.get(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Inspection {id} not found")))?;

        let urls = self
            .uploader
            .upload_all(&submission.photos)
            .await
            .or_keep(&existing.photo_urls());
        let update = InspectionRecordUpdate::from_uploads(submission.valve_code, urls);
        let updated = self.bounded(self.repository.update(id, update)).await?;
        tracing::info!(
            target: "offline::router",
            record_id = %updated.id,
            status = %updated.status,
            "inspection updated"
        );
        Ok(updated)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await?,
            None => call.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{BlobStore, KeyValueStore, UploadOptions};
    use crate::domain::entities::{InspectionFilter, PageRequest, PhotoSet, SortOrder};
    use crate::domain::value_objects::{CompletionStatus, EntryStatus, PhotoPayload, ValveCode};
    use crate::infrastructure::storage::MemoryKeyValueStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapRepository {
        records: Mutex<HashMap<String, InspectionRecord>>,
        fail: bool,
        stall: bool,
    }

    #[async_trait]
    impl InspectionRepository for MapRepository {
        async fn insert(&self, record: NewInspectionRecord) -> Result<InspectionRecord, AppError> {
            if self.fail {
                return Err(AppError::Network("remote unavailable".into()));
            }
            if self.stall {
                std::future::pending::<()>().await;
            }
            let saved = InspectionRecord {
                id: InspectionId::generate(),
                valve_code: Some(record.valve_code.to_string()),
                inspection_date: Utc::now(),
                photo_initial_url: record.photos.initial,
                photo_during_url: record.photos.during,
                photo_final_url: record.photos.final_,
                notes: record.notes,
                status: record.status,
            };
            self.records
                .lock()
                .unwrap()
                .insert(saved.id.to_string(), saved.clone());
            Ok(saved)
        }

        async fn update(
            &self,
            id: &InspectionId,
            update: InspectionRecordUpdate,
        ) -> Result<InspectionRecord, AppError> {
            let mut records = self.records.lock().unwrap();
            let record = records
                .get_mut(id.as_str())
                .ok_or_else(|| AppError::NotFound(id.to_string()))?;
            if let Some(code) = update.valve_code {
                record.valve_code = Some(code.to_string());
            }
            if let Some(photos) = update.photos {
                record.photo_initial_url = photos.initial;
                record.photo_during_url = photos.during;
                record.photo_final_url = photos.final_;
            }
            if let Some(status) = update.status {
                record.status = status;
            }
            Ok(record.clone())
        }

        async fn delete(&self, id: &InspectionId) -> Result<(), AppError> {
            self.records.lock().unwrap().remove(id.as_str());
            Ok(())
        }

        async fn get(&self, id: &InspectionId) -> Result<Option<InspectionRecord>, AppError> {
            Ok(self.records.lock().unwrap().get(id.as_str()).cloned())
        }

        async fn list(
            &self,
            _filter: &InspectionFilter,
            _order: SortOrder,
            _page: PageRequest,
        ) -> Result<Vec<InspectionRecord>, AppError> {
            Ok(self.records.lock().unwrap().values().cloned().collect())
        }

        async fn count(&self, _filter: &InspectionFilter) -> Result<u64, AppError> {
            Ok(self.records.lock().unwrap().len() as u64)
        }
    }

    #[derive(Default)]
    struct CountingBlobStore {
        uploads: Mutex<usize>,
    }

    #[async_trait]
    impl BlobStore for CountingBlobStore {
        async fn upload(
            &self,
            _path: &str,
            _bytes: &[u8],
            _options: UploadOptions,
        ) -> Result<(), AppError> {
            *self.uploads.lock().unwrap() += 1;
            Ok(())
        }

        fn public_url(&self, path: &str) -> String {
            format!("https://blobs.test/{path}")
        }
    }

    struct FullDisk;

    impl KeyValueStore for FullDisk {
        fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), AppError> {
            Err(AppError::Storage("no space left on device".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), AppError> {
            Ok(())
        }
    }

    struct Fixture {
        router: SubmissionRouter,
        monitor: Arc<ConnectivityMonitor>,
        queue: Arc<LocalQueueStore>,
        repository: Arc<MapRepository>,
        blobs: Arc<CountingBlobStore>,
    }

    fn fixture(online: bool, repository: MapRepository) -> Fixture {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let queue = Arc::new(LocalQueueStore::new(store, "queue"));
        let monitor = Arc::new(ConnectivityMonitor::new(online));
        let blobs = Arc::new(CountingBlobStore::default());
        let uploader = Arc::new(PhotoUploader::new(blobs.clone()));
        let repository = Arc::new(repository);
        let router = SubmissionRouter::new(
            monitor.clone(),
            queue.clone(),
            uploader,
            repository.clone(),
        );
        Fixture {
            router,
            monitor,
            queue,
            repository,
            blobs,
        }
    }

    fn photo() -> Option<PhotoPayload> {
        Some(PhotoPayload::inline("image/jpeg", b"jpeg"))
    }

    fn submission(code: &str, photos: PhotoSet) -> InspectionSubmission {
        InspectionSubmission::new(ValveCode::new(code.into()).unwrap(), photos)
    }

    #[tokio::test]
    async fn online_submit_with_three_photos_is_completed() {
        let fx = fixture(true, MapRepository::default());

        let outcome = fx
            .router
            .submit(
                submission("VLV-1", PhotoSet::new(photo(), photo(), photo())),
                None,
            )
            .await
            .unwrap();

        let SubmissionOutcome::Saved(record) = outcome else {
            panic!("expected a saved record, got {outcome:?}");
        };
        assert_eq!(record.status, CompletionStatus::Completed);
        assert_eq!(*fx.blobs.uploads.lock().unwrap(), 3);
        assert!(fx.queue.load().is_empty());
    }

    #[tokio::test]
    async fn offline_submit_is_queued_without_upload() {
        let fx = fixture(false, MapRepository::default());

        let outcome = fx
            .router
            .submit(submission("VLV-9", PhotoSet::new(photo(), None, None)), None)
            .await
            .unwrap();

        let SubmissionOutcome::Queued(id) = outcome else {
            panic!("expected a queued entry, got {outcome:?}");
        };
        let queued = fx.queue.load();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].id, id);
        assert_eq!(queued[0].status, EntryStatus::Pending);
        assert!(queued[0].photo_initial.as_ref().is_some_and(PhotoPayload::is_inline));
        assert_eq!(*fx.blobs.uploads.lock().unwrap(), 0);
        assert_eq!(fx.repository.records.lock().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn edit_keeps_previous_urls_for_untouched_slots() {
        let fx = fixture(true, MapRepository::default());
        let SubmissionOutcome::Saved(first_save) = fx
            .router
            .submit(submission("VLV-2", PhotoSet::new(photo(), None, None)), None)
            .await
            .unwrap()
        else {
            panic!("expected a saved record");
        };
        assert_eq!(first_save.status, CompletionStatus::InProgress);

        let outcome = fx
            .router
            .submit(
                submission("VLV-2", PhotoSet::new(None, photo(), photo())),
                Some(first_save.id.clone()),
            )
            .await
            .unwrap();

        let SubmissionOutcome::Updated(updated) = outcome else {
            panic!("expected an updated record, got {outcome:?}");
        };
        assert_eq!(updated.id, first_save.id);
        assert_eq!(updated.photo_initial_url, first_save.photo_initial_url);
        assert!(updated.photo_during_url.is_some());
        assert_eq!(updated.status, CompletionStatus::Completed);
    }

    #[tokio::test]
    async fn edit_of_unknown_record_is_not_found() {
        let fx = fixture(true, MapRepository::default());

        let err = fx
            .router
            .submit(
                submission("VLV-2", PhotoSet::new(photo(), None, None)),
                Some(InspectionId::generate()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn edit_while_offline_is_rejected() {
        let fx = fixture(true, MapRepository::default());
        fx.monitor.set_online(false);

        let err = fx
            .router
            .submit(
                submission("VLV-2", PhotoSet::new(photo(), None, None)),
                Some(InspectionId::generate()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Offline(_)));
        assert!(fx.queue.load().is_empty());
    }

    #[tokio::test]
    async fn online_failure_propagates_and_does_not_queue() {
        let fx = fixture(
            true,
            MapRepository {
                fail: true,
                ..Default::default()
            },
        );

        let err = fx
            .router
            .submit(submission("VLV-3", PhotoSet::new(photo(), None, None)), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Network(_)));
        assert!(fx.queue.load().is_empty());
    }

    #[tokio::test]
    async fn offline_enqueue_failure_is_a_storage_error() {
        let queue = Arc::new(LocalQueueStore::new(Arc::new(FullDisk), "queue"));
        let blobs = Arc::new(CountingBlobStore::default());
        let router = SubmissionRouter::new(
            Arc::new(ConnectivityMonitor::new(false)),
            queue.clone(),
            Arc::new(PhotoUploader::new(blobs.clone())),
            Arc::new(MapRepository::default()),
        );

        let err = router
            .submit(submission("VLV-9", PhotoSet::new(photo(), None, None)), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)), "{err:?}");
        assert_eq!(*blobs.uploads.lock().unwrap(), 0);
        assert!(queue.load().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_online_insert_times_out_without_queueing() {
        let mut fx = fixture(
            true,
            MapRepository {
                stall: true,
                ..Default::default()
            },
        );
        fx.router = fx.router.with_timeout(Some(Duration::from_secs(30)));

        let err = fx
            .router
            .submit(submission("VLV-4", PhotoSet::new(photo(), None, None)), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Timeout(_)), "{err:?}");
        assert!(fx.queue.load().is_empty());
        assert!(fx.repository.records.lock().unwrap().is_empty());
    }
}
