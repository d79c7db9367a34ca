use core_config::{ConfigError, FromEnv, env_first, env_or_default, env_parse};
use std::path::PathBuf;

pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Credentials for signed Cloudinary uploads
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder images are placed in
    pub folder: String,
}

#[derive(Clone, Debug)]
pub struct UploadConfig {
    /// Directory used by the local disk store
    pub dir: PathBuf,
    /// Per-file size limit in bytes
    pub max_bytes: usize,
    /// Set when all three `CLOUDINARY_*` variables are present
    pub cloudinary: Option<CloudinaryConfig>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_bytes: DEFAULT_MAX_BYTES,
            cloudinary: None,
        }
    }
}

impl FromEnv for UploadConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let dir = PathBuf::from(env_or_default("UPLOAD_PATH", "uploads"));
        let max_bytes = env_parse("UPLOAD_MAX_BYTES", DEFAULT_MAX_BYTES)?;
        if max_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "UPLOAD_MAX_BYTES".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        let cloudinary = match (
            env_first(&["CLOUDINARY_CLOUD_NAME"]),
            env_first(&["CLOUDINARY_API_KEY"]),
            env_first(&["CLOUDINARY_API_SECRET"]),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
                folder: env_or_default("CLOUDINARY_FOLDER", "delta-fashion"),
            }),
            (None, None, None) => None,
            _ => {
                tracing::warn!("Incomplete Cloudinary credentials, falling back to local uploads");
                None
            }
        };

        Ok(Self {
            dir,
            max_bytes,
            cloudinary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOUDINARY_VARS: [&str; 3] = [
        "CLOUDINARY_CLOUD_NAME",
        "CLOUDINARY_API_KEY",
        "CLOUDINARY_API_SECRET",
    ];

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(
            [&["UPLOAD_PATH", "UPLOAD_MAX_BYTES"][..], &CLOUDINARY_VARS[..]].concat(),
            || {
                let config = UploadConfig::from_env().unwrap();
                assert_eq!(config.dir, PathBuf::from("uploads"));
                assert_eq!(config.max_bytes, 5_242_880);
                assert!(config.cloudinary.is_none());
            },
        );
    }

    #[test]
    fn test_cloudinary_requires_all_credentials() {
        temp_env::with_vars(
            [
                ("CLOUDINARY_CLOUD_NAME", Some("demo")),
                ("CLOUDINARY_API_KEY", Some("123")),
                ("CLOUDINARY_API_SECRET", None),
            ],
            || {
                assert!(UploadConfig::from_env().unwrap().cloudinary.is_none());
            },
        );

        temp_env::with_vars(
            [
                ("CLOUDINARY_CLOUD_NAME", Some("demo")),
                ("CLOUDINARY_API_KEY", Some("123")),
                ("CLOUDINARY_API_SECRET", Some("shh")),
                ("CLOUDINARY_FOLDER", None),
            ],
            || {
                let cloudinary = UploadConfig::from_env().unwrap().cloudinary.unwrap();
                assert_eq!(cloudinary.cloud_name, "demo");
                assert_eq!(cloudinary.folder, "delta-fashion");
            },
        );
    }

    #[test]
    fn test_zero_max_bytes_is_invalid() {
        temp_env::with_var("UPLOAD_MAX_BYTES", Some("0"), || {
            assert!(matches!(
                UploadConfig::from_env(),
                Err(ConfigError::Invalid { .. })
            ));
        });
    }
}
