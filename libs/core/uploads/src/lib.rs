//! Product and banner image uploads.
//!
//! Images arrive as multipart form data, are checked against the accepted
//! formats and size limit, then handed to an [`ImageStore`]:
//!
//! - [`LocalDiskStore`] writes under `UPLOAD_PATH`; the API serves the
//!   directory at `/uploads`
//! - [`CloudinaryStore`] uses signed uploads when the `CLOUDINARY_*`
//!   credentials are all present
//!
//! ```rust,no_run
//! use core_config::FromEnv;
//! use uploads::{UploadConfig, build_store, handlers};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = UploadConfig::from_env()?;
//! let store = build_store(&config);
//! let router = handlers::router(store, config.max_bytes);
//! # Ok(())
//! # }
//! ```

pub mod cloudinary;
pub mod config;
pub mod error;
pub mod handlers;
pub mod local;
pub mod multipart;
pub mod store;
pub mod validation;

pub use cloudinary::CloudinaryStore;
pub use config::{CloudinaryConfig, UploadConfig};
pub use error::{UploadError, UploadResult};
pub use handlers::ApiDoc;
pub use local::LocalDiskStore;
pub use store::{ImageStore, StoredImage, build_store};
pub use validation::{ImageKind, MAX_FILES_PER_REQUEST};
