use crate::application::ports::{BlobStore, UploadOptions};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Deletes a blob that was opened for writing unless `keep` is called, so a
/// failed or cancelled upload leaves no truncated file behind.
struct PartialBlob<'a> {
    path: &'a Path,
    armed: bool,
}

impl<'a> PartialBlob<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, armed: true }
    }

    fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialBlob<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = std::fs::remove_file(self.path)
            && err.kind() != ErrorKind::NotFound
        {
            tracing::warn!(
                target: "offline::upload",
                path = %self.path.display(),
                error = %err,
                "failed to remove partial blob"
            );
        }
    }
}

/// Blob store on the local filesystem, addressed through a public base URL.
pub struct FsBlobStore {
    root_dir: PathBuf,
    public_base_url: String,
}

impl FsBlobStore {
    pub fn new(root_dir: impl Into<PathBuf>, public_base_url: &str) -> Result<Self, AppError> {
        let root_dir = root_dir.into();
        std::fs::create_dir_all(&root_dir).map_err(|err| {
            AppError::Storage(format!("Failed to create blob dir: {err}"))
        })?;
        Ok(Self {
            root_dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(path);
        let is_plain = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(AppError::InvalidInput(format!("Invalid blob path: {path}")));
        }
        Ok(self.root_dir.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        options: UploadOptions,
    ) -> Result<(), AppError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| AppError::Storage(format!("Failed to create blob dir: {err}")))?;
        }

        let mut open = fs::OpenOptions::new();
        open.write(true);
        if options.upsert {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }
        let mut file = open.open(&target).await.map_err(|err| {
            if err.kind() == ErrorKind::AlreadyExists {
                AppError::Storage(format!("Blob already exists: {path}"))
            } else {
                AppError::Storage(format!("Failed to open blob {path}: {err}"))
            }
        })?;
        let partial = PartialBlob::new(&target);
        file.write_all(bytes)
            .await
            .map_err(|err| AppError::Storage(format!("Failed to write blob {path}: {err}")))?;
        file.flush()
            .await
            .map_err(|err| AppError::Storage(format!("Failed to flush blob {path}: {err}")))?;
        partial.keep();

        tracing::debug!(
            target: "offline::upload",
            path,
            content_type = %options.content_type,
            size = bytes.len(),
            "blob written"
        );
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refuses_to_overwrite_without_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "https://cdn.test/").unwrap();

        store
            .upload("a/b.jpg", b"one", UploadOptions::no_overwrite("image/jpeg"))
            .await
            .unwrap();
        let err = store
            .upload("a/b.jpg", b"two", UploadOptions::no_overwrite("image/jpeg"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(std::fs::read(dir.path().join("a/b.jpg")).unwrap(), b"one");
        assert_eq!(store.public_url("a/b.jpg"), "https://cdn.test/a/b.jpg");
    }

    #[tokio::test]
    async fn upsert_replaces_existing_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "https://cdn.test").unwrap();
        let options = UploadOptions {
            content_type: "image/png".into(),
            upsert: true,
        };

        store.upload("x.png", b"one", options.clone()).await.unwrap();
        store.upload("x.png", b"two", options).await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("x.png")).unwrap(), b"two");
    }

    #[test]
    fn unfinished_blob_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let abandoned = dir.path().join("abandoned.jpg");
        let finished = dir.path().join("finished.jpg");
        std::fs::write(&abandoned, b"half").unwrap();
        std::fs::write(&finished, b"whole").unwrap();

        drop(PartialBlob::new(&abandoned));
        PartialBlob::new(&finished).keep();

        assert!(!abandoned.exists());
        assert_eq!(std::fs::read(&finished).unwrap(), b"whole");
    }

    #[tokio::test]
    async fn rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "https://cdn.test").unwrap();

        let err = store
            .upload("../out.jpg", b"x", UploadOptions::no_overwrite("image/jpeg"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
