use crate::domain::entities::InspectionRecord;
use crate::domain::value_objects::{CompletionStatus, InspectionId};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::{Row, sqlite::SqliteRow};

pub(super) fn map_inspection_row(row: &SqliteRow) -> Result<InspectionRecord, AppError> {
    let id: String = row.try_get("id")?;
    let inspection_date: i64 = row.try_get("inspection_date")?;
    let status: String = row.try_get("status")?;

    Ok(InspectionRecord {
        id: InspectionId::new(id).map_err(AppError::DeserializationError)?,
        valve_code: row.try_get("valve_code")?,
        inspection_date: DateTime::from_timestamp_millis(inspection_date).unwrap_or_else(Utc::now),
        photo_initial_url: row.try_get("photo_initial_url")?,
        photo_during_url: row.try_get("photo_during_url")?,
        photo_final_url: row.try_get("photo_final_url")?,
        notes: row.try_get("notes")?,
        status: CompletionStatus::parse(&status).map_err(AppError::DeserializationError)?,
    })
}
