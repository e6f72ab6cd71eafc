use crate::application::ports::{BlobStore, UploadOptions};
use crate::domain::entities::{PhotoSet, PhotoUrls};
use crate::domain::value_objects::{InlineImage, PhotoPayload, PhotoSlot};
use crate::shared::error::AppError;
use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::sync::Arc;
use std::time::Duration;

const PHOTO_PREFIX: &str = "inspections";
const TOKEN_LEN: usize = 12;

/// Turns photo payloads into blob store addresses.
pub struct PhotoUploader {
    blob_store: Arc<dyn BlobStore>,
    call_timeout: Option<Duration>,
}

impl PhotoUploader {
    pub fn new(blob_store: Arc<dyn BlobStore>) -> Self {
        Self {
            blob_store,
            call_timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Stores one slot's payload. `None` means the slot failed; the failure is
    /// logged here and must not abort sibling slots.
    pub async fn upload(&self, payload: &PhotoPayload, slot: PhotoSlot) -> Option<String> {
        match payload {
            PhotoPayload::Remote(url) => Some(url.clone()),
            PhotoPayload::Inline(image) => match self.store_inline(image, slot).await {
                Ok(url) => Some(url),
                Err(err) => {
                    tracing::warn!(
                        target: "offline::upload",
                        slot = slot.as_str(),
                        error = %err,
                        "photo upload failed"
                    );
                    None
                }
            },
        }
    }

    /// Uploads every filled slot in initial, during, final order.
    pub async fn upload_all(&self, photos: &PhotoSet) -> PhotoUrls {
        let mut urls = PhotoUrls::default();
        for slot in PhotoSlot::ALL {
            if let Some(payload) = photos.get(slot) {
                urls.set(slot, self.upload(payload, slot).await);
            }
        }
        urls
    }

    async fn store_inline(&self, image: &InlineImage, slot: PhotoSlot) -> Result<String, AppError> {
        let bytes = image
            .decode()
            .map_err(|err| AppError::InvalidInput(err.to_string()))?;
        let path = storage_path(slot, image.file_extension());
        let options = UploadOptions::no_overwrite(image.mime_type());

        let upload = self.blob_store.upload(&path, &bytes, options);
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, upload).await??,
            None => upload.await?,
        }

        tracing::debug!(
            target: "offline::upload",
            slot = slot.as_str(),
            path = %path,
            size = bytes.len(),
            "photo stored"
        );
        Ok(self.blob_store.public_url(&path))
    }
}

fn storage_path(slot: PhotoSlot, extension: &str) -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect();
    format!(
        "{PHOTO_PREFIX}/{}_{}_{}.{extension}",
        Utc::now().timestamp_millis(),
        token.to_ascii_lowercase(),
        slot.as_str()
    )
}
