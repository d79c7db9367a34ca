//! Storage backends for uploaded images

use crate::cloudinary::CloudinaryStore;
use crate::config::UploadConfig;
use crate::error::UploadResult;
use crate::local::LocalDiskStore;
use crate::validation::ImageKind;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// A validated image ready to be stored
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub kind: ImageKind,
    /// File name sent by the client, informational only
    pub original_name: Option<String>,
}

/// Where an image ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StoredImage {
    /// Public URL to reference from products and banners
    pub url: String,
    /// Identifier accepted by `DELETE /admin/uploads/{key}`
    pub key: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an image under a freshly generated key
    async fn put(&self, image: ImageUpload) -> UploadResult<StoredImage>;

    /// Remove a previously stored image
    async fn delete(&self, key: &str) -> UploadResult<()>;

    /// Check the backend is usable
    async fn health_check(&self) -> UploadResult<()>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Cloudinary when configured, local disk otherwise.
pub fn build_store(config: &UploadConfig) -> Arc<dyn ImageStore> {
    match &config.cloudinary {
        Some(cloudinary) => {
            tracing::info!(cloud = %cloudinary.cloud_name, "Using Cloudinary image store");
            Arc::new(CloudinaryStore::new(cloudinary.clone()))
        }
        None => {
            tracing::info!(dir = %config.dir.display(), "Using local disk image store");
            Arc::new(LocalDiskStore::new(config.dir.clone()))
        }
    }
}

/// Generated object name: time-ordered UUID plus the format's extension.
pub(crate) fn generate_key(kind: ImageKind) -> String {
    format!("{}.{}", uuid::Uuid::now_v7(), kind.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CloudinaryConfig;
    use crate::validation::validate_key;

    #[test]
    fn test_build_store_picks_backend() {
        let local = build_store(&UploadConfig::default());
        assert_eq!(local.name(), "local");

        let config = UploadConfig {
            cloudinary: Some(CloudinaryConfig {
                cloud_name: "demo".to_string(),
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
                folder: "delta-fashion".to_string(),
            }),
            ..UploadConfig::default()
        };
        assert_eq!(build_store(&config).name(), "cloudinary");
    }

    #[test]
    fn test_generated_keys_are_valid_and_unique() {
        let a = generate_key(ImageKind::Webp);
        let b = generate_key(ImageKind::Webp);
        assert!(a.ends_with(".webp"));
        assert_ne!(a, b);
        assert!(validate_key(&a).is_ok());
    }
}
