use crate::application::ports::{
    BlobStore, ConnectivityProbe, InspectionRepository, KeyValueStore, SyncEventEmitter,
};
use crate::application::services::{
    ConnectivityMonitor, LocalQueueStore, PhotoUploader, SubmissionRouter, SyncEngine,
    SyncEngineOptions,
};
use crate::infrastructure::connectivity::{TcpConnectivityProbe, spawn_probe_loop};
use crate::infrastructure::database::{ConnectionPool, SqliteInspectionRepository};
use crate::infrastructure::events::BroadcastSyncEmitter;
use crate::infrastructure::storage::{FileKeyValueStore, FsBlobStore};
use crate::presentation::handlers::SyncHandler;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Wires adapters, services and the UI handler for one process.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: ConnectionPool,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub queue: Arc<LocalQueueStore>,
    pub sync_engine: Arc<SyncEngine>,
    pub submission_router: Arc<SubmissionRouter>,
    pub sync_handler: Arc<SyncHandler>,
    pub events: BroadcastSyncEmitter,
    background: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        std::fs::create_dir_all(&config.storage.data_dir).map_err(|err| {
            AppError::Storage(format!(
                "Failed to create data dir {}: {err}",
                config.storage.data_dir
            ))
        })?;

        let pool = ConnectionPool::from_config(&config.database).await?;
        let repository = SqliteInspectionRepository::new(pool.clone());
        repository.initialize().await?;
        let repository: Arc<dyn InspectionRepository> = Arc::new(repository);

        let key_value: Arc<dyn KeyValueStore> =
            Arc::new(FileKeyValueStore::new(&config.storage.data_dir)?);
        let blob_store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(
            &config.storage.blob_dir,
            &config.storage.public_base_url,
        )?);

        let events = BroadcastSyncEmitter::new();
        let emitter: Arc<dyn SyncEventEmitter> = Arc::new(events.clone());
        let call_timeout = config.sync.remote_call_timeout();

        let connectivity = Arc::new(ConnectivityMonitor::new(config.connectivity.initial_online));
        let queue = Arc::new(
            LocalQueueStore::new(key_value, config.storage.queue_key.clone())
                .with_emitter(Arc::clone(&emitter)),
        );
        let uploader = Arc::new(PhotoUploader::new(blob_store).with_timeout(call_timeout));
        let sync_engine = Arc::new(
            SyncEngine::new(
                Arc::clone(&queue),
                Arc::clone(&uploader),
                Arc::clone(&repository),
                SyncEngineOptions {
                    cooldown: config.sync.cooldown(),
                    call_timeout,
                },
            )
            .with_emitter(emitter),
        );
        let submission_router = Arc::new(
            SubmissionRouter::new(
                Arc::clone(&connectivity),
                Arc::clone(&queue),
                uploader,
                Arc::clone(&repository),
            )
            .with_timeout(call_timeout),
        );
        let sync_handler = Arc::new(SyncHandler::new(
            Arc::clone(&connectivity),
            Arc::clone(&queue),
            Arc::clone(&sync_engine),
            Arc::clone(&submission_router),
            repository,
            events.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            pool,
            connectivity,
            queue,
            sync_engine,
            submission_router,
            sync_handler,
            events,
            background: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Recovers interrupted drains and spawns the background sync triggers.
    pub async fn start(&self) -> Result<(), AppError> {
        let recovered = self.sync_engine.recover_interrupted()?;
        if recovered > 0 {
            tracing::info!(target: "offline::sync", recovered, "recovered interrupted entries");
        }

        let mut background = self.background.lock().await;
        background.push(
            self.sync_engine
                .watch_connectivity(&self.connectivity, self.config.sync.settle_delay()),
        );

        if let Some(address) = &self.config.connectivity.probe_address {
            let probe: Arc<dyn ConnectivityProbe> = Arc::new(TcpConnectivityProbe::new(
                address.clone(),
                Duration::from_millis(self.config.connectivity.probe_timeout_ms),
            ));
            background.push(spawn_probe_loop(
                probe,
                Arc::clone(&self.connectivity),
                Duration::from_millis(self.config.connectivity.probe_interval_ms),
            ));
        }

        if let Some(period) = self.config.sync.periodic_interval() {
            background.push(
                self.sync_engine
                    .spawn_periodic(period, self.connectivity.watch()),
            );
        }

        tracing::info!(
            tasks = background.len(),
            pending = self.queue.pending_count(),
            online = self.connectivity.is_online(),
            "offline sync started"
        );
        Ok(())
    }

    pub async fn shutdown(&self) {
        let mut background = self.background.lock().await;
        for handle in background.drain(..) {
            handle.abort();
        }
        self.pool.close().await;
    }
}
