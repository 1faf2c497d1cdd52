//! # Image Payload Module
//!
//! Inline image parts for the extraction call. A payload is a MIME type plus
//! base64 data, built from a file on disk, raw bytes, or a string that is
//! either a `data:<mime>;base64,<data>` URI or a bare base64 payload.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, info};

use crate::errors::{RecipeError, Result};

/// MIME type assumed when none can be detected
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";
/// Fewest images an extraction call accepts
pub const MIN_IMAGES: usize = 1;
/// Most images an extraction call accepts
pub const MAX_IMAGES: usize = 5;
/// Per-image size limit for files read from disk
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB
/// Minimum bytes required for format detection
pub const MIN_FORMAT_BYTES: usize = 8;

/// An image ready to be sent inline to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    /// Base64 encoded image bytes, without any `data:` header
    pub data: String,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Parse a data URI or a bare base64 payload.
    ///
    /// Never fails: a missing or unreadable header falls back to sniffing the
    /// decoded bytes, then to [`DEFAULT_MIME_TYPE`].
    pub fn from_data_uri(input: &str) -> Self {
        let input = input.trim();
        let (header, data) = match input.split_once(',') {
            Some((header, data)) => (Some(header), data),
            None => (None, input),
        };

        let declared = header
            .and_then(|h| h.strip_prefix("data:"))
            .map(|h| h.split(';').next().unwrap_or_default().trim())
            .filter(|mime| mime.contains('/'))
            .map(str::to_string);

        let mime_type = declared
            .or_else(|| sniff_base64_mime(data))
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        Self::new(mime_type, data)
    }

    /// Encode raw image bytes, detecting the MIME type from magic bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mime_type = sniff_mime(bytes).unwrap_or(DEFAULT_MIME_TYPE);
        Self::new(mime_type, BASE64.encode(bytes))
    }

    /// Read and validate an image file
    pub fn from_path(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Loading image");

        let metadata = fs::metadata(path).map_err(|e| {
            RecipeError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        })?;
        if !metadata.is_file() {
            return Err(RecipeError::InvalidInput(format!(
                "{} is not a file",
                path.display()
            )));
        }
        if metadata.len() > MAX_FILE_SIZE {
            return Err(RecipeError::InvalidInput(format!(
                "{} is too large ({} bytes, limit {MAX_FILE_SIZE})",
                path.display(),
                metadata.len()
            )));
        }

        let bytes = fs::read(path).map_err(|e| {
            RecipeError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        })?;
        if !is_supported_image(&bytes) {
            return Err(RecipeError::InvalidInput(format!(
                "{} is not a supported image (PNG, JPEG or WebP)",
                path.display()
            )));
        }

        Ok(Self::from_bytes(&bytes))
    }

    /// Interpret a command-line argument: data URIs inline, anything else a path
    pub fn from_argument(arg: &str) -> Result<Self> {
        if arg.trim_start().starts_with("data:") {
            Ok(Self::from_data_uri(arg))
        } else {
            Self::from_path(Path::new(arg))
        }
    }
}

/// Check the image count accepted by one extraction call
pub fn validate_image_count(count: usize) -> Result<()> {
    if (MIN_IMAGES..=MAX_IMAGES).contains(&count) {
        Ok(())
    } else {
        Err(RecipeError::InvalidInput(format!(
            "expected between {MIN_IMAGES} and {MAX_IMAGES} images, got {count}"
        )))
    }
}

/// Whether the bytes are in a format the model accepts inline
pub fn is_supported_image(bytes: &[u8]) -> bool {
    sniff_mime(bytes).is_some()
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < MIN_FORMAT_BYTES {
        debug!(len = bytes.len(), "Too few bytes to detect image format");
        return None;
    }
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => Some("image/png"),
        Ok(image::ImageFormat::Jpeg) => Some("image/jpeg"),
        Ok(image::ImageFormat::WebP) => Some("image/webp"),
        Ok(other) => {
            debug!(format = ?other, "Detected unsupported image format");
            None
        }
        Err(_) => None,
    }
}

fn sniff_base64_mime(data: &str) -> Option<String> {
    // 32 base64 chars decode to 24 bytes, plenty for magic numbers
    let head: Vec<u8> = data
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .take(32)
        .collect();
    if !head
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
    {
        return None;
    }
    let usable = head.len() - head.len() % 4;
    let bytes = BASE64.decode(&head[..usable]).ok()?;
    sniff_mime(&bytes).map(str::to_string)
}
