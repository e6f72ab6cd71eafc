use crate::application::ports::{InspectionRepository, SyncEvent};
use crate::application::services::{
    ConnectivityMonitor, LocalQueueStore, SubmissionRouter, SyncEngine,
};
use crate::domain::entities::{DrainOutcome, PendingInspectionEntry};
use crate::infrastructure::events::BroadcastSyncEmitter;
use crate::presentation::dto::inspection_dto::{
    InspectionPageResponse, ListInspectionsRequest, SubmissionResponse, SubmitInspectionRequest,
    SyncPendingResponse, SyncStatusResponse,
};
use crate::presentation::dto::{ApiResponse, Validate};
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::broadcast;

/// UI-facing surface of the offline sync subsystem.
pub struct SyncHandler {
    monitor: Arc<ConnectivityMonitor>,
    queue: Arc<LocalQueueStore>,
    engine: Arc<SyncEngine>,
    router: Arc<SubmissionRouter>,
    repository: Arc<dyn InspectionRepository>,
    events: BroadcastSyncEmitter,
}

impl SyncHandler {
    pub fn new(
        monitor: Arc<ConnectivityMonitor>,
        queue: Arc<LocalQueueStore>,
        engine: Arc<SyncEngine>,
        router: Arc<SubmissionRouter>,
        repository: Arc<dyn InspectionRepository>,
        events: BroadcastSyncEmitter,
    ) -> Self {
        Self {
            monitor,
            queue,
            engine,
            router,
            repository,
            events,
        }
    }

    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    pub fn is_syncing(&self) -> bool {
        self.engine.is_syncing()
    }

    pub fn pending_count(&self) -> usize {
        self.engine.pending_count()
    }

    pub fn status(&self) -> SyncStatusResponse {
        SyncStatusResponse {
            is_online: self.is_online(),
            is_syncing: self.is_syncing(),
            pending_count: self.pending_count(),
            metrics: self.engine.metrics(),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.monitor.set_online(online);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Queues the inspection regardless of connectivity. `false` when the
    /// request is invalid or the queue could not be written.
    pub fn save_pending_inspection(&self, request: SubmitInspectionRequest) -> bool {
        let entry = request
            .validate()
            .map_err(AppError::ValidationError)
            .and_then(|_| request.to_submission())
            .map(|submission| PendingInspectionEntry::new(submission.valve_code, submission.photos));
        let result = entry.and_then(|entry| self.queue.append(entry));

        match result {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(
                    target: "offline::queue",
                    error = %err,
                    "failed to save pending inspection"
                );
                false
            }
        }
    }

    /// Manual sync trigger; only drains while online. Dropped requests still
    /// report the current queue length.
    pub async fn sync_pending_data(&self) -> Result<SyncPendingResponse, AppError> {
        if !self.monitor.is_online() {
            return Err(AppError::Offline(
                "Cannot sync while offline".to_string(),
            ));
        }
        let outcome = self.engine.drain().await?;
        let skipped = !matches!(outcome, DrainOutcome::Completed(_));
        let mut response = SyncPendingResponse::from(outcome);
        if skipped {
            response.pending_count = self.queue.pending_count() as u32;
        }
        Ok(response)
    }

    pub async fn submit(
        &self,
        request: SubmitInspectionRequest,
    ) -> ApiResponse<SubmissionResponse> {
        ApiResponse::from_result(self.submit_inner(request).await)
    }

    async fn submit_inner(
        &self,
        request: SubmitInspectionRequest,
    ) -> Result<SubmissionResponse, AppError> {
        request.validate().map_err(AppError::ValidationError)?;
        let submission = request.to_submission()?;
        let editing_id = request.editing_id()?;

        let outcome = self.router.submit(submission, editing_id).await?;
        Ok(outcome.into())
    }

    pub async fn list_inspections(
        &self,
        request: ListInspectionsRequest,
    ) -> Result<InspectionPageResponse, AppError> {
        request.validate().map_err(AppError::ValidationError)?;
        let filter = request.filter()?;

        let records = self
            .repository
            .list(&filter, request.order(), request.page())
            .await?;
        let total = self.repository.count(&filter).await?;

        Ok(InspectionPageResponse {
            items: records.into_iter().map(Into::into).collect(),
            total,
        })
    }
}
