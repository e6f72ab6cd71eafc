pub mod completion_status;
pub mod entry_id;
pub mod entry_status;
pub mod inspection_id;
pub mod photo_payload;
pub mod photo_slot;
pub mod valve_code;

pub use completion_status::CompletionStatus;
pub use entry_id::PendingEntryId;
pub use entry_status::EntryStatus;
pub use inspection_id::InspectionId;
pub use photo_payload::{InlineImage, PhotoPayload, PhotoPayloadError};
pub use photo_slot::PhotoSlot;
pub use valve_code::ValveCode;
