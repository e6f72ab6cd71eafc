use super::connectivity_monitor::{ConnectivityEvent, ConnectivityMonitor};
use super::local_queue_store::LocalQueueStore;
use super::photo_uploader::PhotoUploader;
use crate::application::ports::{InspectionRepository, SyncEvent, SyncEventEmitter};
use crate::domain::entities::{
    DrainOutcome, InspectionRecord, NewInspectionRecord, PendingInspectionEntry, SyncResult,
};
use crate::domain::value_objects::{EntryStatus, PendingEntryId};
use crate::shared::error::AppError;
use crate::shared::metrics::{SyncMetrics, SyncMetricsSnapshot};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast::error::RecvError, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct SyncEngineOptions {
    /// Minimum spacing between two drain attempts.
    pub cooldown: Duration,
    /// Bound on each remote insert, `None` waits indefinitely.
    pub call_timeout: Option<Duration>,
}

impl Default for SyncEngineOptions {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(2),
            call_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Drains the local queue into the remote store.
///
/// One drain runs at a time per engine. Requests arriving while a drain is
/// active, or within the cooldown of the previous attempt, are dropped.
pub struct SyncEngine {
    queue: Arc<LocalQueueStore>,
    uploader: Arc<PhotoUploader>,
    repository: Arc<dyn InspectionRepository>,
    event_emitter: Option<Arc<dyn SyncEventEmitter>>,
    options: SyncEngineOptions,
    draining: AtomicBool,
    last_attempt: Mutex<Option<Instant>>,
    metrics: SyncMetrics,
}

struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncEngine {
    pub fn new(
        queue: Arc<LocalQueueStore>,
        uploader: Arc<PhotoUploader>,
        repository: Arc<dyn InspectionRepository>,
        options: SyncEngineOptions,
    ) -> Self {
        Self {
            queue,
            uploader,
            repository,
            event_emitter: None,
            options,
            draining: AtomicBool::new(false),
            last_attempt: Mutex::new(None),
            metrics: SyncMetrics::new(),
        }
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn SyncEventEmitter>) -> Self {
        self.event_emitter = Some(emitter);
        self
    }

    pub fn is_syncing(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }

    pub fn metrics(&self) -> SyncMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Resets entries left in `syncing` by an interrupted process to `failed`
    /// so the next drain picks them up again.
    pub fn recover_interrupted(&self) -> Result<usize, AppError> {
        if !self.queue.load().iter().any(|e| e.status == EntryStatus::Syncing) {
            return Ok(0);
        }
        let recovered = self.queue.update(|entries| {
            let mut recovered = 0;
            for entry in entries
                .iter_mut()
                .filter(|entry| entry.status == EntryStatus::Syncing)
            {
                entry.status = EntryStatus::Failed;
                recovered += 1;
            }
            recovered
        })?;
        tracing::info!(
            target: "offline::sync",
            recovered,
            "reset interrupted entries to failed"
        );
        Ok(recovered)
    }

    /// Runs one drain cycle unless another is active or cooling down.
    pub async fn drain(&self) -> Result<DrainOutcome, AppError> {
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(target: "offline::sync", "drain already active, request dropped");
            self.metrics.record_skip();
            return Ok(DrainOutcome::AlreadyDraining);
        }
        let _guard = DrainGuard(&self.draining);

        if !self.claim_attempt() {
            tracing::debug!(target: "offline::sync", "drain cooling down, request dropped");
            self.metrics.record_skip();
            return Ok(DrainOutcome::CoolingDown);
        }

        let started = Instant::now();
        let selected = self.lock_eligible_entries()?;
        if selected.is_empty() {
            return Ok(DrainOutcome::NothingToSync);
        }
        tracing::info!(
            target: "offline::sync",
            entries = selected.len(),
            "draining pending inspections"
        );

        let mut succeeded = HashSet::new();
        let mut failed = HashSet::new();
        for entry in &selected {
            match self.replay(entry).await {
                Ok(record) => {
                    tracing::debug!(
                        target: "offline::sync",
                        entry_id = %entry.id,
                        record_id = %record.id,
                        status = %record.status,
                        "pending inspection recorded"
                    );
                    succeeded.insert(entry.id.clone());
                }
                Err(err) => {
                    tracing::warn!(
                        target: "offline::sync",
                        entry_id = %entry.id,
                        error = %err,
                        "pending inspection insert failed, will retry"
                    );
                    failed.insert(entry.id.clone());
                }
            }
        }

        let pending_count = self.reconcile(&succeeded, &failed)?;
        let result = SyncResult::new(
            succeeded.len() as u32,
            failed.len() as u32,
            pending_count as u32,
        );
        self.metrics
            .record_drain(result.synced_count, result.failed_count, started.elapsed());
        self.emit(&SyncEvent::DrainCompleted(result.clone()));
        tracing::info!(
            target: "offline::sync",
            synced = result.synced_count,
            failed = result.failed_count,
            pending = result.pending_count,
            "drain completed"
        );

        Ok(DrainOutcome::Completed(result))
    }

    /// Drains and logs the outcome; used by background triggers.
    pub async fn drain_logged(&self, trigger: &'static str) -> Option<DrainOutcome> {
        match self.drain().await {
            Ok(outcome) => {
                tracing::debug!(target: "offline::sync", trigger, ?outcome, "drain request handled");
                Some(outcome)
            }
            Err(err) => {
                tracing::error!(
                    target: "offline::sync",
                    trigger,
                    error = %err,
                    "drain aborted"
                );
                None
            }
        }
    }

    /// Drains after each `WentOnline` once the connection stayed up for `settle`.
    pub fn watch_connectivity(
        self: &Arc<Self>,
        monitor: &ConnectivityMonitor,
        settle: Duration,
    ) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        let mut events = monitor.subscribe();
        let online = monitor.watch();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ConnectivityEvent::WentOnline) => {
                        tokio::time::sleep(settle).await;
                        if !*online.borrow() {
                            tracing::debug!(
                                target: "offline::sync",
                                "connection dropped while settling"
                            );
                            continue;
                        }
                        engine.drain_logged("reconnect").await;
                    }
                    Ok(ConnectivityEvent::WentOffline) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            target: "offline::sync",
                            skipped,
                            "connectivity events lagged"
                        );
                        if *online.borrow() {
                            engine.drain_logged("reconnect").await;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Drains on a fixed period while online. The first tick fires immediately.
    pub fn spawn_periodic(
        self: &Arc<Self>,
        period: Duration,
        online: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if *online.borrow() {
                    engine.drain_logged("periodic").await;
                }
            }
        })
    }

    fn claim_attempt(&self) -> bool {
        let mut last_attempt = self
            .last_attempt
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Instant::now();
        if let Some(previous) = *last_attempt
            && now.duration_since(previous) < self.options.cooldown
        {
            return false;
        }
        *last_attempt = Some(now);
        true
    }

    fn lock_eligible_entries(&self) -> Result<Vec<PendingInspectionEntry>, AppError> {
        if !self.queue.load().iter().any(|e| e.is_eligible_for_sync()) {
            return Ok(Vec::new());
        }
        self.queue.update(|entries| {
            entries
                .iter_mut()
                .filter(|entry| entry.is_eligible_for_sync())
                .map(|entry| {
                    entry.status = EntryStatus::Syncing;
                    entry.clone()
                })
                .collect()
        })
    }

    async fn replay(&self, entry: &PendingInspectionEntry) -> Result<InspectionRecord, AppError> {
        let urls = self.uploader.upload_all(&entry.photos()).await;
        let record = NewInspectionRecord::from_uploads(entry.valve_code.clone(), urls);
        let insert = self.repository.insert(record);
        match self.options.call_timeout {
            Some(limit) => tokio::time::timeout(limit, insert).await?,
            None => insert.await,
        }
    }

    /// Applies drain results to the current queue, keeping entries added meanwhile.
    fn reconcile(
        &self,
        succeeded: &HashSet<PendingEntryId>,
        failed: &HashSet<PendingEntryId>,
    ) -> Result<usize, AppError> {
        self.queue.update(|entries| {
            entries.retain(|entry| !succeeded.contains(&entry.id));
            for entry in entries.iter_mut().filter(|entry| failed.contains(&entry.id)) {
                entry.status = EntryStatus::Failed;
            }
            entries.len()
        })
    }

    fn emit(&self, event: &SyncEvent) {
        if let Some(emitter) = &self.event_emitter
            && let Err(err) = emitter.emit(event)
        {
            tracing::warn!(
                target: "offline::sync",
                error = %err,
                "failed to emit sync event"
            );
        }
    }
}
