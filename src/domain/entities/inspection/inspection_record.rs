use super::photo_set::PhotoUrls;
use crate::domain::value_objects::{CompletionStatus, InspectionId, ValveCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A durably recorded inspection as held by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub id: InspectionId,
    pub valve_code: Option<String>,
    pub inspection_date: DateTime<Utc>,
    pub photo_initial_url: Option<String>,
    pub photo_during_url: Option<String>,
    pub photo_final_url: Option<String>,
    pub notes: Option<String>,
    pub status: CompletionStatus,
}

impl InspectionRecord {
    pub fn photo_urls(&self) -> PhotoUrls {
        PhotoUrls {
            initial: self.photo_initial_url.clone(),
            during: self.photo_during_url.clone(),
            final_: self.photo_final_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInspectionRecord {
    pub valve_code: ValveCode,
    pub photos: PhotoUrls,
    pub notes: Option<String>,
    pub status: CompletionStatus,
}

impl NewInspectionRecord {
    /// Builds the insert payload; the status always follows the stored photos.
    pub fn from_uploads(valve_code: ValveCode, photos: PhotoUrls) -> Self {
        let status = photos.completion_status();
        Self {
            valve_code,
            photos,
            notes: None,
            status,
        }
    }
}

/// Partial update; `None` fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectionRecordUpdate {
    pub valve_code: Option<ValveCode>,
    pub photos: Option<PhotoUrls>,
    pub notes: Option<Option<String>>,
    pub status: Option<CompletionStatus>,
}

impl InspectionRecordUpdate {
    pub fn from_uploads(valve_code: ValveCode, photos: PhotoUrls) -> Self {
        let status = photos.completion_status();
        Self {
            valve_code: Some(valve_code),
            photos: Some(photos),
            notes: None,
            status: Some(status),
        }
    }
}
