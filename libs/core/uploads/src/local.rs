use crate::error::{UploadError, UploadResult};
use crate::store::{ImageStore, ImageUpload, StoredImage, generate_key};
use crate::validation::validate_key;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::instrument;

/// URL prefix the API serves the upload directory under
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Stores images as files in a single directory
pub struct LocalDiskStore {
    dir: PathBuf,
}

impl LocalDiskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl ImageStore for LocalDiskStore {
    #[instrument(skip(self, image), fields(kind = ?image.kind, size = image.bytes.len()))]
    async fn put(&self, image: ImageUpload) -> UploadResult<StoredImage> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let key = generate_key(image.kind);
        tokio::fs::write(self.dir.join(&key), &image.bytes).await?;

        tracing::info!(%key, original = ?image.original_name, "Image stored on disk");
        Ok(StoredImage {
            url: format!("{}/{}", PUBLIC_PREFIX, key),
            key,
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> UploadResult<()> {
        validate_key(key)?;

        match tokio::fs::remove_file(self.dir.join(key)).await {
            Ok(()) => {
                tracing::info!(%key, "Image deleted from disk");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(UploadError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn health_check(&self) -> UploadResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
