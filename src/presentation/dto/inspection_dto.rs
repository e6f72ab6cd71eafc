use super::{PaginationRequest, Validate};
use crate::application::services::SubmissionOutcome;
use crate::domain::entities::{
    DrainOutcome, InspectionFilter, InspectionRecord, InspectionSubmission, PageRequest, PhotoSet,
    SortOrder,
};
use crate::domain::value_objects::{CompletionStatus, InspectionId, PhotoPayload, ValveCode};
use crate::shared::error::AppError;
use crate::shared::metrics::SyncMetricsSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Photos arrive as `data:` URLs captured on the device, or as URLs of
/// photos stored earlier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitInspectionRequest {
    pub valve_code: String,
    #[serde(default)]
    pub photo_initial: Option<String>,
    #[serde(default)]
    pub photo_during: Option<String>,
    #[serde(default)]
    pub photo_final: Option<String>,
    #[serde(default)]
    pub editing_id: Option<String>,
}

impl Validate for SubmitInspectionRequest {
    fn validate(&self) -> Result<(), String> {
        if self.valve_code.trim().is_empty() {
            return Err("Valve code is required".to_string());
        }
        let has_photo = [&self.photo_initial, &self.photo_during, &self.photo_final]
            .iter()
            .any(|photo| photo.as_deref().is_some_and(|value| !value.trim().is_empty()));
        if !has_photo {
            return Err("At least one photo is required".to_string());
        }
        if let Some(id) = &self.editing_id
            && id.trim().is_empty()
        {
            return Err("Editing ID cannot be empty".to_string());
        }
        Ok(())
    }
}

impl SubmitInspectionRequest {
    pub fn to_submission(&self) -> Result<InspectionSubmission, AppError> {
        let valve_code =
            ValveCode::new(self.valve_code.clone()).map_err(AppError::ValidationError)?;
        let photos = PhotoSet::new(
            parse_photo(self.photo_initial.as_deref())?,
            parse_photo(self.photo_during.as_deref())?,
            parse_photo(self.photo_final.as_deref())?,
        );
        Ok(InspectionSubmission::new(valve_code, photos))
    }

    pub fn editing_id(&self) -> Result<Option<InspectionId>, AppError> {
        self.editing_id
            .as_ref()
            .map(|id| InspectionId::new(id.trim().to_string()).map_err(AppError::ValidationError))
            .transpose()
    }
}

fn parse_photo(value: Option<&str>) -> Result<Option<PhotoPayload>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => PhotoPayload::parse(raw)
            .map(Some)
            .map_err(|err| AppError::ValidationError(format!("Invalid photo: {err}"))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecordResponse {
    pub id: String,
    pub valve_code: Option<String>,
    pub inspection_date: DateTime<Utc>,
    pub photo_initial_url: Option<String>,
    pub photo_during_url: Option<String>,
    pub photo_final_url: Option<String>,
    pub notes: Option<String>,
    pub status: String,
}

impl From<InspectionRecord> for InspectionRecordResponse {
    fn from(record: InspectionRecord) -> Self {
        Self {
            id: record.id.to_string(),
            valve_code: record.valve_code,
            inspection_date: record.inspection_date,
            photo_initial_url: record.photo_initial_url,
            photo_during_url: record.photo_during_url,
            photo_final_url: record.photo_final_url,
            notes: record.notes,
            status: record.status.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    /// `saved`, `updated` or `queued`.
    pub outcome: String,
    pub record: Option<InspectionRecordResponse>,
    pub pending_id: Option<String>,
    pub message: String,
}

impl From<SubmissionOutcome> for SubmissionResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Saved(record) => Self {
                outcome: "saved".to_string(),
                record: Some(record.into()),
                pending_id: None,
                message: "Inspection saved".to_string(),
            },
            SubmissionOutcome::Updated(record) => Self {
                outcome: "updated".to_string(),
                record: Some(record.into()),
                pending_id: None,
                message: "Inspection updated".to_string(),
            },
            SubmissionOutcome::Queued(id) => Self {
                outcome: "queued".to_string(),
                record: None,
                pending_id: Some(id.to_string()),
                message: "Saved offline, will sync when the connection returns".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPendingResponse {
    /// `completed`, `nothing_to_sync`, `already_draining` or `cooling_down`.
    pub outcome: String,
    pub synced_count: u32,
    pub failed_count: u32,
    pub pending_count: u32,
    pub message: Option<String>,
}

impl From<DrainOutcome> for SyncPendingResponse {
    fn from(outcome: DrainOutcome) -> Self {
        let (name, result) = match &outcome {
            DrainOutcome::Completed(result) => ("completed", Some(result)),
            DrainOutcome::NothingToSync => ("nothing_to_sync", None),
            DrainOutcome::AlreadyDraining => ("already_draining", None),
            DrainOutcome::CoolingDown => ("cooling_down", None),
        };
        Self {
            outcome: name.to_string(),
            synced_count: result.map_or(0, |r| r.synced_count),
            failed_count: result.map_or(0, |r| r.failed_count),
            pending_count: result.map_or(0, |r| r.pending_count),
            message: result.map(|r| r.summary()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusResponse {
    pub is_online: bool,
    pub is_syncing: bool,
    pub pending_count: usize,
    pub metrics: SyncMetricsSnapshot,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInspectionsRequest {
    /// `em_andamento` or `concluido`.
    pub status: Option<String>,
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ascending: bool,
    pub pagination: Option<PaginationRequest>,
}

impl Validate for ListInspectionsRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(status) = &self.status {
            CompletionStatus::parse(status)?;
        }
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err("Date range start must not be after its end".to_string());
        }
        if let Some(limit) = self.pagination.as_ref().and_then(|p| p.limit)
            && !(1..=200).contains(&limit)
        {
            return Err("Limit must be between 1 and 200".to_string());
        }
        Ok(())
    }
}

impl ListInspectionsRequest {
    pub fn filter(&self) -> Result<InspectionFilter, AppError> {
        let mut filter = InspectionFilter::default().between(self.from, self.to);
        if let Some(status) = &self.status {
            filter = filter.with_status(
                CompletionStatus::parse(status).map_err(AppError::ValidationError)?,
            );
        }
        if let Some(search) = &self.search {
            filter = filter.with_search(search.as_str());
        }
        Ok(filter)
    }

    pub fn order(&self) -> SortOrder {
        if self.ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }

    pub fn page(&self) -> PageRequest {
        let defaults = PageRequest::default();
        let pagination = self.pagination.clone().unwrap_or_default();
        PageRequest {
            limit: pagination.limit.unwrap_or(defaults.limit),
            offset: pagination.offset.unwrap_or(defaults.offset),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionPageResponse {
    pub items: Vec<InspectionRecordResponse>,
    pub total: u64,
}
