//! Admin upload endpoints

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
};
use axum_helpers::errors::responses::{
    BadRequestValidationResponse, ForbiddenResponse, InternalServerErrorResponse,
    NotFoundResponse, UnauthorizedResponse,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UploadResult;
use crate::multipart::read_images;
use crate::store::{ImageStore, StoredImage};
use crate::validation::{ImageKind, MAX_FILES_PER_REQUEST};

#[derive(OpenApi)]
#[openapi(
    paths(upload_images, delete_image),
    components(
        schemas(StoredImage, ImageKind),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = "Uploads", description = "Image uploads for products and banners"))
)]
pub struct ApiDoc;

#[derive(Clone)]
struct UploadState {
    store: Arc<dyn ImageStore>,
    max_bytes: usize,
}

/// Upload routes, to be nested under `/admin/uploads` behind the admin gate.
pub fn router(store: Arc<dyn ImageStore>, max_bytes: usize) -> Router {
    // Whole-body cap: every file at the limit plus room for part headers.
    let body_limit = max_bytes
        .saturating_mul(MAX_FILES_PER_REQUEST)
        .saturating_add(64 * 1024);

    Router::new()
        .route("/", post(upload_images))
        .route("/{key}", delete(delete_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(UploadState { store, max_bytes })
}

/// Upload one or more images
///
/// Multipart form with files under `images` (repeatable) or `image`.
#[utoipa::path(
    post,
    path = "/admin/uploads",
    tag = "Uploads",
    request_body(content_type = "multipart/form-data", description = "Image files under `images` or `image`"),
    responses(
        (status = 201, description = "Images stored", body = Vec<StoredImage>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 413, description = "A file exceeds the size limit"),
        (status = 415, description = "Unsupported image type"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn upload_images(
    State(state): State<UploadState>,
    multipart: Multipart,
) -> UploadResult<impl IntoResponse> {
    let images = read_images(multipart, state.max_bytes).await?;

    let mut stored = Vec::with_capacity(images.len());
    for image in images {
        match state.store.put(image).await {
            Ok(item) => stored.push(item),
            Err(e) => {
                // Don't leave half of a batch behind
                for item in &stored {
                    if let Err(cleanup) = state.store.delete(&item.key).await {
                        tracing::warn!(key = %item.key, error = %cleanup, "Failed to remove partial upload");
                    }
                }
                return Err(e);
            }
        }
    }

    tracing::info!(count = stored.len(), store = state.store.name(), "Images uploaded");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Delete a stored image
#[utoipa::path(
    delete,
    path = "/admin/uploads/{key}",
    tag = "Uploads",
    params(("key" = String, Path, description = "Key returned by the upload")),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_image(
    State(state): State<UploadState>,
    Path(key): Path<String>,
) -> UploadResult<StatusCode> {
    state.store.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UploadError;
    use crate::store::MockImageStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_delete_maps_not_found() {
        let mut store = MockImageStore::new();
        store
            .expect_delete()
            .returning(|key| Err(UploadError::NotFound(key.to_string())));

        let app = router(Arc::new(store), 1024);
        let response = app
            .oneshot(
                Request::delete("/0192f3a4-0000-7000-8000-000000000000.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
