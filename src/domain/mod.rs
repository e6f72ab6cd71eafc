pub mod entities;
pub mod value_objects;

pub use entities::{InspectionRecord, PendingInspectionEntry, PhotoSet, PhotoUrls, SyncResult};
pub use value_objects::{CompletionStatus, EntryStatus, PhotoPayload, PhotoSlot, ValveCode};
