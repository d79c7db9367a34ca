use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No image files were provided")]
    NoFiles,

    #[error("Too many files: at most {max} per request")]
    TooManyFiles { max: usize },

    #[error("File '{name}' exceeds the {max_bytes} byte limit")]
    TooLarge { name: String, max_bytes: usize },

    #[error("Unsupported file type '{0}': only JPEG, PNG, WebP and GIF images are accepted")]
    UnsupportedType(String),

    #[error("File '{0}' is not a valid image")]
    CorruptImage(String),

    #[error("Invalid image key '{0}'")]
    InvalidKey(String),

    #[error("Image '{0}' not found")]
    NotFound(String),

    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image host error: {0}")]
    Provider(String),
}

pub type UploadResult<T> = Result<T, UploadError>;

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            UploadError::UnsupportedType(_) | UploadError::CorruptImage(_) => {
                AppError::UnsupportedMediaType(err.to_string())
            }
            UploadError::NoFiles
            | UploadError::TooManyFiles { .. }
            | UploadError::InvalidKey(_)
            | UploadError::Multipart(_) => AppError::BadRequest(err.to_string()),
            UploadError::NotFound(_) => AppError::NotFound(err.to_string()),
            UploadError::Io(e) => AppError::Io(e),
            UploadError::Provider(msg) => AppError::Storage(msg),
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        UploadError::Provider(err.to_string())
    }
}
