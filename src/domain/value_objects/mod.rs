pub mod inspection;

pub use inspection::{
    CompletionStatus, EntryStatus, InlineImage, InspectionId, PendingEntryId, PhotoPayload,
    PhotoPayloadError, PhotoSlot, ValveCode,
};
