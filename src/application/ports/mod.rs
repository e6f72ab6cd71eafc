pub mod blob_store;
pub mod connectivity_probe;
pub mod inspection_repository;
pub mod key_value_store;
pub mod sync_event_emitter;

pub use blob_store::{BlobStore, UploadOptions};
pub use connectivity_probe::ConnectivityProbe;
pub use inspection_repository::InspectionRepository;
pub use key_value_store::KeyValueStore;
pub use sync_event_emitter::{SyncEvent, SyncEventEmitter};
