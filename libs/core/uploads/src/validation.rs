use crate::error::{UploadError, UploadResult};
use serde::Serialize;
use utoipa::ToSchema;

pub const MAX_FILES_PER_REQUEST: usize = 10;

const MAX_KEY_LEN: usize = 128;

/// Accepted image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageKind {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Detect the format from the file signature.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }
}

/// Check a received file.
///
/// The declared content type must be an accepted image type and the bytes
/// must carry a matching signature; the sniffed kind wins when they disagree
/// within the accepted set.
pub fn validate_image(
    name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
    max_bytes: usize,
) -> UploadResult<ImageKind> {
    let declared = content_type.unwrap_or("application/octet-stream");
    ImageKind::from_content_type(declared)
        .ok_or_else(|| UploadError::UnsupportedType(declared.to_string()))?;

    if bytes.len() > max_bytes {
        return Err(UploadError::TooLarge {
            name: name.to_string(),
            max_bytes,
        });
    }

    ImageKind::sniff(bytes).ok_or_else(|| UploadError::CorruptImage(name.to_string()))
}

/// Keys are generated file names; anything that could address another path
/// is rejected.
pub fn validate_key(key: &str) -> UploadResult<()> {
    let well_formed = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && !key.starts_with('.')
        && !key.contains("..")
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if well_formed {
        Ok(())
    } else {
        Err(UploadError::InvalidKey(key.to_string()))
    }
}
