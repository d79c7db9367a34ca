//! Cloudinary image store
//!
//! Uses the signed upload API: parameters are sorted, joined as
//! `k=v&k=v`, suffixed with the API secret and hashed with SHA-256.

use crate::config::CloudinaryConfig;
use crate::error::{UploadError, UploadResult};
use crate::store::{ImageStore, ImageUpload, StoredImage, generate_key};
use crate::validation::validate_key;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::instrument;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

pub struct CloudinaryStore {
    config: CloudinaryConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", API_BASE, self.config.cloud_name, action)
    }

    /// `public_id` without the extension: Cloudinary appends its own.
    fn public_id(key: &str) -> &str {
        key.rsplit_once('.').map_or(key, |(stem, _)| stem)
    }

    /// Signed form fields common to upload and destroy.
    fn signed_form(&self, key: &str) -> Form {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let public_id = Self::public_id(key);
        let params = [
            ("folder", self.config.folder.as_str()),
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
        ];
        let signature = sign(&params, &self.config.api_secret);

        Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("folder", self.config.folder.clone())
            .text("public_id", public_id.to_string())
            .text("timestamp", timestamp.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => format!("{} ({})", body.error.message, status),
            Err(_) => format!("unexpected response ({})", status),
        }
    }
}

/// Hex SHA-256 of the sorted `k=v` pairs followed by the secret.
pub(crate) fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by_key(|(k, _)| *k);

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    const_hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageStore for CloudinaryStore {
    #[instrument(skip(self, image), fields(kind = ?image.kind, size = image.bytes.len()))]
    async fn put(&self, image: ImageUpload) -> UploadResult<StoredImage> {
        let key = generate_key(image.kind);
        let file_name = image.original_name.clone().unwrap_or_else(|| key.clone());
        let part = Part::bytes(image.bytes)
            .file_name(file_name)
            .mime_str(image.kind.mime())?;

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(self.signed_form(&key).part("file", part))
            .send()
            .await?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            tracing::error!(%key, %message, "Cloudinary upload failed");
            return Err(UploadError::Provider(message));
        }

        let body: UploadResponse = response.json().await?;
        tracing::info!(%key, url = %body.secure_url, "Image uploaded to Cloudinary");
        Ok(StoredImage {
            url: body.secure_url,
            key,
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> UploadResult<()> {
        validate_key(key)?;

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(self.signed_form(key))
            .send()
            .await?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            return Err(UploadError::Provider(message));
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => Err(UploadError::NotFound(key.to_string())),
            other => Err(UploadError::Provider(format!("destroy returned '{}'", other))),
        }
    }

    async fn health_check(&self) -> UploadResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "cloudinary"
    }
}
