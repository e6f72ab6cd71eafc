pub mod inspection;

pub use inspection::{
    DrainOutcome, InspectionFilter, InspectionRecord, InspectionRecordUpdate,
    InspectionSubmission, NewInspectionRecord, PageRequest, PendingInspectionEntry, PhotoSet,
    PhotoUrls, SortOrder, SyncResult,
};
