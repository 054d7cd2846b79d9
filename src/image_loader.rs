//! Image loading for uploaded sensor photographs
//!
//! Accepts the formats the upload form allows (PNG, JPEG, BMP, GIF, WebP)
//! and always returns an 8-bit RGB buffer, whatever the source pixel
//! format. Region sampling relies on that conversion happening here.

use std::path::Path;

use image::{DynamicImage, ImageReader, RgbImage};

use crate::error::{AnalysisError, Result};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    /// First frame only
    Gif,
    WebP,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        Self::from_extension_str(path.extension()?.to_str()?)
    }

    /// Match a bare extension such as `"JPG"`, case-insensitively
    pub fn from_extension_str(ext: &str) -> Option<ImageFormat> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "bmp" => Some(ImageFormat::Bmp),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }
}

/// Load an image from disk as 8-bit RGB
///
/// # Errors
///
/// Returns `UnsupportedFormat` for extensions outside the accepted set,
/// `ImageLoadError` if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let format = ImageFormat::from_extension(path).ok_or_else(|| {
        AnalysisError::UnsupportedFormat {
            path: path.to_path_buf(),
        }
    })?;

    let reader = ImageReader::open(path).map_err(|e| {
        AnalysisError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;

    // Uploads are often renamed; trust the content over the extension
    let reader = reader.with_guessed_format().map_err(|e| {
        AnalysisError::image_load(format!("Failed to read image file: {}", path.display()), e)
    })?;

    let img: DynamicImage = reader.decode().map_err(|e| {
        AnalysisError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    tracing::debug!(
        path = %path.display(),
        ?format,
        width = img.width(),
        height = img.height(),
        "Decoded image"
    );

    Ok(img.to_rgb8())
}

/// Decode an in-memory image (e.g. a decoded base64 upload) as 8-bit RGB
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AnalysisError::image_load("Failed to decode image data", e))?;
    Ok(img.to_rgb8())
}

/// Check if a file extension is supported, e.g. before accepting an upload
pub fn is_supported_extension(ext: &str) -> bool {
    ImageFormat::from_extension_str(ext).is_some()
}
