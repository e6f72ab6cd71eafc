use crate::domain::value_objects::{CompletionStatus, PhotoPayload, PhotoSlot};
use serde::{Deserialize, Serialize};

/// The three photo slots of an inspection before upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoSet {
    pub initial: Option<PhotoPayload>,
    pub during: Option<PhotoPayload>,
    pub final_: Option<PhotoPayload>,
}

impl PhotoSet {
    pub fn new(
        initial: Option<PhotoPayload>,
        during: Option<PhotoPayload>,
        final_: Option<PhotoPayload>,
    ) -> Self {
        Self {
            initial,
            during,
            final_,
        }
    }

    pub fn get(&self, slot: PhotoSlot) -> Option<&PhotoPayload> {
        match slot {
            PhotoSlot::Initial => self.initial.as_ref(),
            PhotoSlot::During => self.during.as_ref(),
            PhotoSlot::Final => self.final_.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        PhotoSlot::ALL.iter().all(|slot| self.get(*slot).is_none())
    }

    pub fn filled_slots(&self) -> usize {
        PhotoSlot::ALL
            .iter()
            .filter(|slot| self.get(**slot).is_some())
            .count()
    }
}

/// Stored photo addresses, one per slot; `None` means no stored photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoUrls {
    pub initial: Option<String>,
    pub during: Option<String>,
    pub final_: Option<String>,
}

impl PhotoUrls {
    pub fn get(&self, slot: PhotoSlot) -> Option<&str> {
        match slot {
            PhotoSlot::Initial => self.initial.as_deref(),
            PhotoSlot::During => self.during.as_deref(),
            PhotoSlot::Final => self.final_.as_deref(),
        }
    }

    pub fn set(&mut self, slot: PhotoSlot, url: Option<String>) {
        match slot {
            PhotoSlot::Initial => self.initial = url,
            PhotoSlot::During => self.during = url,
            PhotoSlot::Final => self.final_ = url,
        }
    }

    /// Fills slots left empty here with the addresses from `previous`.
    pub fn or_keep(mut self, previous: &PhotoUrls) -> Self {
        for slot in PhotoSlot::ALL {
            if self.get(slot).is_none() {
                self.set(slot, previous.get(slot).map(str::to_string));
            }
        }
        self
    }

    pub fn completion_status(&self) -> CompletionStatus {
        CompletionStatus::derive(
            self.initial.as_deref(),
            self.during.as_deref(),
            self.final_.as_deref(),
        )
    }
}
