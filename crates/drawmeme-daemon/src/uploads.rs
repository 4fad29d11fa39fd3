//! Image artifact storage.
//!
//! Launch requests carry the drawing as base64 (optionally as a
//! `data:image/...;base64,` URL straight from the canvas). The image is
//! written under the uploads directory and only its `/uploads/<file>`
//! reference travels on to the registry.

use std::path::{Path, PathBuf};

use base64::Engine;
use tracing::{debug, warn};

/// Public URL prefix for stored images.
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

/// Upload failures.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Image file is required")]
    Missing,

    #[error("Image payload is not valid base64")]
    Decode,

    #[error("Image is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },

    #[error("Only image files are allowed")]
    NotAnImage,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Recognized image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    /// Detect the format from the leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Writes uploaded images to disk.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(dir: PathBuf, max_bytes: usize) -> Self {
        Self { dir, max_bytes }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decode, check and persist an image. Returns its `/uploads/...` URL.
    pub async fn save_base64(
        &self,
        payload: &str,
        content_type: Option<&str>,
    ) -> Result<String, UploadError> {
        let (declared, data) = split_data_url(payload.trim());
        let content_type = content_type.or(declared);
        if data.is_empty() {
            return Err(UploadError::Missing);
        }
        if let Some(ct) = content_type {
            if !ct.starts_with("image/") {
                return Err(UploadError::NotAnImage);
            }
        }

        // Reject obviously oversized payloads before allocating.
        let estimated = data.len() / 4 * 3;
        if estimated > self.max_bytes + 3 {
            return Err(UploadError::TooLarge {
                size: estimated,
                max: self.max_bytes,
            });
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|_| UploadError::Decode)?;
        self.save_bytes(&bytes).await
    }

    /// Check and persist raw image bytes. Returns its `/uploads/...` URL.
    pub async fn save_bytes(&self, bytes: &[u8]) -> Result<String, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Missing);
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }
        let kind = ImageKind::sniff(bytes).ok_or(UploadError::NotAnImage)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = format!("{}.{}", random_name(), kind.extension());
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        debug!("Stored {} byte image as {}", bytes.len(), file_name);
        Ok(format!("{UPLOADS_URL_PREFIX}{file_name}"))
    }

    /// Delete a stored image by its `/uploads/...` URL. Used when a launch
    /// fails after the image was written. URLs outside this store are
    /// ignored.
    pub async fn discard(&self, image_url: &str) {
        let Some(file_name) = image_url.strip_prefix(UPLOADS_URL_PREFIX) else {
            return;
        };
        if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.dir.join(file_name)).await {
            warn!("Failed to discard upload {}: {}", file_name, e);
        }
    }
}

/// Split `data:<mime>;base64,<data>` into its mime type and data.
fn split_data_url(payload: &str) -> (Option<&str>, &str) {
    if let Some(rest) = payload.strip_prefix("data:") {
        if let Some((meta, data)) = rest.split_once(',') {
            let mime = meta.strip_suffix(";base64").unwrap_or(meta);
            return (Some(mime), data);
        }
    }
    (None, payload)
}

fn random_name() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}
