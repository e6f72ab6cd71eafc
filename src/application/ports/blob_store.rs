use crate::shared::error::AppError;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    /// Replace an existing object at the same path.
    pub upsert: bool,
}

impl UploadOptions {
    pub fn no_overwrite(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            upsert: false,
        }
    }
}

/// Object storage for photo bytes. Callers pick unique paths.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        options: UploadOptions,
    ) -> Result<(), AppError>;
    fn public_url(&self, path: &str) -> String;
}
