//! Image intake: decode uploads, sniff their type, shrink them for the AI
//! call and derive a history thumbnail.
//!
//! DESIGN
//! ======
//! Uploads arrive as a data URI, bare base64, or raw multipart bytes. The
//! MIME type is always taken from the magic bytes; a declared type is only
//! advisory. Oversized photos are downscaled and re-encoded as JPEG before
//! they leave the process, and history keeps a small JPEG thumbnail rather
//! than the full original. Bytes that sniff as an image but fail to decode
//! are passed through untouched.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::{debug, warn};

pub const DEFAULT_MAX_EDGE_PX: u32 = 1536;
pub const DEFAULT_THUMBNAIL_EDGE_PX: u32 = 256;

const UPLOAD_JPEG_QUALITY: u8 = 85;
const THUMBNAIL_JPEG_QUALITY: u8 = 70;
const JPEG_MIME: &str = "image/jpeg";

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageConfig {
    /// Longest edge sent to the provider. Larger photos are downscaled.
    pub max_edge_px: u32,
    /// Longest edge of the thumbnail stored with each history item.
    pub thumbnail_edge_px: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self { max_edge_px: DEFAULT_MAX_EDGE_PX, thumbnail_edge_px: DEFAULT_THUMBNAIL_EDGE_PX }
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("image payload is empty")]
    Empty,
    #[error("malformed data URI")]
    MalformedDataUri,
    #[error("image payload is not valid base64")]
    InvalidBase64,
    #[error("payload is not a supported image (JPEG, PNG, WebP or GIF)")]
    Unsupported,
}

impl crate::error::ErrorCode for ImageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "E_IMAGE_EMPTY",
            Self::MalformedDataUri => "E_IMAGE_DATA_URI",
            Self::InvalidBase64 => "E_IMAGE_BASE64",
            Self::Unsupported => "E_IMAGE_UNSUPPORTED",
        }
    }
}

// =============================================================================
// IMAGE FILE
// =============================================================================

/// One uploaded image with its sniffed MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Parse a `data:<mime>;base64,<payload>` URI or a bare base64 payload.
    ///
    /// # Errors
    ///
    /// Fails on empty input, a data URI that is not base64-encoded, invalid
    /// base64, or bytes that are not a supported image format.
    pub fn from_encoded(input: &str) -> Result<Self, ImageError> {
        let payload = strip_data_uri(input.trim())?;
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        if compact.is_empty() {
            return Err(ImageError::Empty);
        }
        let bytes = BASE64.decode(compact.as_bytes()).map_err(|_| ImageError::InvalidBase64)?;
        Self::from_bytes(bytes)
    }

    /// Wrap raw uploaded bytes.
    ///
    /// # Errors
    ///
    /// Fails when `bytes` is empty or not a supported image format.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        let mime_type = sniff_mime(&bytes).ok_or(ImageError::Unsupported)?;
        Ok(Self { mime_type: mime_type.to_string(), bytes })
    }

    /// Bare base64 payload, as sent to the provider.
    #[must_use]
    pub fn base64_data(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    #[must_use]
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_data())
    }
}

/// Return the payload of a data URI, or the input unchanged when it has no
/// `data:` prefix.
fn strip_data_uri(input: &str) -> Result<&str, ImageError> {
    let Some(rest) = input.strip_prefix("data:") else {
        return Ok(input);
    };
    let (header, payload) = rest.split_once(',').ok_or(ImageError::MalformedDataUri)?;
    if !header.ends_with(";base64") {
        return Err(ImageError::MalformedDataUri);
    }
    Ok(payload)
}

/// Identify a supported image format from its leading bytes.
#[must_use]
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

// =============================================================================
// PREPARATION
// =============================================================================

/// An image ready for the provider plus its history thumbnail.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub upload: ImageFile,
    pub thumbnail_data_uri: String,
    pub resized: bool,
}

/// Downscale `image` for upload and build its thumbnail. CPU-bound; call it
/// from a blocking task.
#[must_use]
pub fn prepare(image: ImageFile, config: &ImageConfig) -> PreparedImage {
    let decoded = match image::load_from_memory(&image.bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, mime = %image.mime_type, bytes = image.bytes.len(), "image: decode failed; sending original");
            let thumbnail_data_uri = image.data_uri();
            return PreparedImage { upload: image, thumbnail_data_uri, resized: false };
        }
    };

    let longest = decoded.width().max(decoded.height());
    let (upload, resized) = if longest > config.max_edge_px {
        let edge = config.max_edge_px;
        match encode_jpeg(&decoded.resize(edge, edge, FilterType::Triangle), UPLOAD_JPEG_QUALITY) {
            Ok(bytes) => {
                debug!(from = longest, to = edge, bytes = bytes.len(), "image: downscaled for upload");
                (ImageFile { mime_type: JPEG_MIME.to_string(), bytes }, true)
            }
            Err(e) => {
                warn!(error = %e, "image: re-encode failed; sending original");
                (image, false)
            }
        }
    } else {
        (image, false)
    };

    let edge = config.thumbnail_edge_px;
    let small = if longest > edge { decoded.thumbnail(edge, edge) } else { decoded };
    let thumbnail_data_uri = match encode_jpeg(&small, THUMBNAIL_JPEG_QUALITY) {
        Ok(bytes) => format!("data:{JPEG_MIME};base64,{}", BASE64.encode(bytes)),
        Err(e) => {
            warn!(error = %e, "image: thumbnail encode failed; using upload");
            upload.data_uri()
        }
    };

    PreparedImage { upload, thumbnail_data_uri, resized }
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    image.to_rgb8().write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
#[path = "image_test.rs"]
mod tests;
