pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod shared;
pub mod state;

pub use application::ports::{
    BlobStore, ConnectivityProbe, InspectionRepository, KeyValueStore, SyncEvent,
    SyncEventEmitter,
};
pub use application::services::{
    ConnectivityEvent, ConnectivityMonitor, LocalQueueStore, PhotoUploader, SubmissionOutcome,
    SubmissionRouter, SyncEngine, SyncEngineOptions,
};
pub use domain::entities::{
    DrainOutcome, InspectionFilter, InspectionRecord, InspectionSubmission, PageRequest,
    PendingInspectionEntry, PhotoSet, PhotoUrls, SortOrder, SyncResult,
};
pub use domain::value_objects::{
    CompletionStatus, EntryStatus, InspectionId, PendingEntryId, PhotoPayload, PhotoSlot,
    ValveCode,
};
pub use infrastructure::database::{ConnectionPool, SqliteInspectionRepository};
pub use infrastructure::events::BroadcastSyncEmitter;
pub use infrastructure::storage::{FileKeyValueStore, FsBlobStore, MemoryKeyValueStore};
pub use presentation::handlers::SyncHandler;
pub use shared::{AppConfig, AppError, Result};
pub use state::AppState;

const DEFAULT_LOG_FILTER: &str = "valve_inspection_lib=debug,offline=debug,connectivity=debug,info";

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
