use crate::error::{UploadError, UploadResult};
use crate::store::ImageUpload;
use crate::validation::{MAX_FILES_PER_REQUEST, validate_image};
use axum::extract::Multipart;

/// Form fields that carry images; other fields are ignored.
pub const IMAGE_FIELDS: [&str; 2] = ["images", "image"];

/// Read and validate every image part of an upload form.
///
/// Parts are streamed chunk by chunk so an oversized file is rejected as
/// soon as it crosses `max_bytes`.
pub async fn read_images(
    mut multipart: Multipart,
    max_bytes: usize,
) -> UploadResult<Vec<ImageUpload>> {
    let mut images = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.body_text()))?
    {
        if !field.name().is_some_and(|name| IMAGE_FIELDS.contains(&name)) {
            continue;
        }
        if images.len() == MAX_FILES_PER_REQUEST {
            return Err(UploadError::TooManyFiles {
                max: MAX_FILES_PER_REQUEST,
            });
        }

        let original_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let display_name = original_name.clone().unwrap_or_else(|| "upload".to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| UploadError::Multipart(e.body_text()))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(UploadError::TooLarge {
                    name: display_name,
                    max_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        let kind = validate_image(&display_name, content_type.as_deref(), &bytes, max_bytes)?;
        images.push(ImageUpload {
            bytes,
            kind,
            original_name,
        });
    }

    if images.is_empty() {
        return Err(UploadError::NoFiles);
    }
    Ok(images)
}
