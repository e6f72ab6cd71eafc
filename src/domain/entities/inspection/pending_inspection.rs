use super::photo_set::PhotoSet;
use crate::domain::value_objects::{EntryStatus, PendingEntryId, PhotoPayload, ValveCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// An inspection captured offline and waiting for remote persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingInspectionEntry {
    pub id: PendingEntryId,
    pub valve_code: ValveCode,
    #[serde(default)]
    pub photo_initial: Option<PhotoPayload>,
    #[serde(default)]
    pub photo_during: Option<PhotoPayload>,
    #[serde(default)]
    pub photo_final: Option<PhotoPayload>,
    pub created_at: i64,
    #[serde(default)]
    pub status: EntryStatus,
}

impl PendingInspectionEntry {
    pub fn new(valve_code: ValveCode, photos: PhotoSet) -> Self {
        Self {
            id: PendingEntryId::generate(),
            valve_code,
            photo_initial: photos.initial,
            photo_during: photos.during,
            photo_final: photos.final_,
            created_at: Utc::now().timestamp_millis(),
            status: EntryStatus::Pending,
        }
    }

    pub fn photos(&self) -> PhotoSet {
        PhotoSet::new(
            self.photo_initial.clone(),
            self.photo_during.clone(),
            self.photo_final.clone(),
        )
    }

    pub fn is_eligible_for_sync(&self) -> bool {
        self.status.is_eligible_for_sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_entry_starts_pending() {
        let photos = PhotoSet::new(Some(PhotoPayload::inline("image/jpeg", b"x")), None, None);
        let entry = PendingInspectionEntry::new(ValveCode::new("VLV-9".into()).unwrap(), photos);

        assert_eq!(entry.status, EntryStatus::Pending);
        assert!(entry.is_eligible_for_sync());
        assert_eq!(entry.photos().filled_slots(), 1);
    }

    #[test]
    fn uses_camel_case_wire_format() {
        let value = json!({
            "id": "1700000000000-abc123xyz",
            "valveCode": "VLV-1",
            "photoInitial": "data:image/jpeg;base64,AQID",
            "photoDuring": null,
            "photoFinal": null,
            "createdAt": 1_700_000_000_000_i64,
            "status": "failed"
        });

        let entry: PendingInspectionEntry = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(entry.status, EntryStatus::Failed);
        assert!(entry.photo_initial.as_ref().is_some_and(PhotoPayload::is_inline));
        assert_eq!(serde_json::to_value(&entry).unwrap(), value);
    }
}
