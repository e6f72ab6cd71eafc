pub mod connectivity_monitor;
pub mod local_queue_store;
pub mod photo_uploader;
pub mod submission_router;
pub mod sync_engine;

pub use connectivity_monitor::{ConnectivityEvent, ConnectivityMonitor};
pub use local_queue_store::{DEFAULT_QUEUE_KEY, LocalQueueStore};
pub use photo_uploader::PhotoUploader;
pub use submission_router::{SubmissionOutcome, SubmissionRouter};
pub use sync_engine::{SyncEngine, SyncEngineOptions};
