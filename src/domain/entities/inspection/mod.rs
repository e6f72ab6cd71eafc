pub mod inspection_query;
pub mod inspection_record;
pub mod pending_inspection;
pub mod photo_set;
pub mod submission;
pub mod sync_result;

pub use inspection_query::{InspectionFilter, PageRequest, SortOrder};
pub use inspection_record::{InspectionRecord, InspectionRecordUpdate, NewInspectionRecord};
pub use pending_inspection::PendingInspectionEntry;
pub use photo_set::{PhotoSet, PhotoUrls};
pub use submission::InspectionSubmission;
pub use sync_result::{DrainOutcome, SyncResult};
