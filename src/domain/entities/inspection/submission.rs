use super::photo_set::PhotoSet;
use crate::domain::value_objects::ValveCode;

/// A finalized inspection form handed to the submission router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionSubmission {
    pub valve_code: ValveCode,
    pub photos: PhotoSet,
}

impl InspectionSubmission {
    pub fn new(valve_code: ValveCode, photos: PhotoSet) -> Self {
        Self { valve_code, photos }
    }
}
