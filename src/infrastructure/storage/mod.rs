pub mod file_key_value_store;
pub mod fs_blob_store;
pub mod memory_key_value_store;

pub use file_key_value_store::FileKeyValueStore;
pub use fs_blob_store::FsBlobStore;
pub use memory_key_value_store::MemoryKeyValueStore;
