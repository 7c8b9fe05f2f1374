//! Image encoding for stitched exports and compressed uploads.
//!
//! This module provides functionality for:
//! - Encoding to baseline JPEG with configurable quality (alpha flattened onto white)
//! - Encoding to PNG with maximum deflate compression (alpha preserved)
//! - Encoding to lossy WebP with configurable quality (alpha preserved)
//!
//! # Examples
//!
//! ```ignore
//! use pintu_core::encode::{encode, OutputFormat};
//!
//! let bytes = encode(&image, OutputFormat::Jpeg, 80).unwrap();
//! println!("Encoded {} bytes", bytes.len());
//! ```

mod jpeg;
mod png;
mod webp;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{DecodedImage, ImageFormatKind};

pub use jpeg::encode_jpeg;
pub use png::encode_png;
pub use webp::encode_webp;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {reason}")]
    EncodingFailed {
        format: &'static str,
        reason: String,
    },
}

/// Formats the pipeline can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    /// Canonical file extension (with leading dot).
    pub fn extension(self) -> &'static str {
        self.kind().extension()
    }

    /// MIME type for storage uploads.
    pub fn mime_type(self) -> &'static str {
        self.kind().mime_type()
    }

    /// The matching detected-format value.
    pub fn kind(self) -> ImageFormatKind {
        match self {
            OutputFormat::Jpeg => ImageFormatKind::Jpeg,
            OutputFormat::Png => ImageFormatKind::Png,
            OutputFormat::WebP => ImageFormatKind::WebP,
        }
    }

    /// Format-preserving choice: PNG and WebP keep their format, anything else
    /// is normalized to JPEG.
    pub fn preserving(source: ImageFormatKind) -> Self {
        match source {
            ImageFormatKind::Png => OutputFormat::Png,
            ImageFormatKind::WebP => OutputFormat::WebP,
            _ => OutputFormat::Jpeg,
        }
    }
}

/// Encode a decoded image in the requested format.
///
/// `quality` (1-100) drives the JPEG and WebP quantizers. PNG is lossless, so
/// quality is ignored there and size comes from deflate level and dimensions.
///
/// # Errors
///
/// Returns an `EncodeError` for empty or inconsistent images, or when the
/// underlying encoder fails.
pub fn encode(
    image: &DecodedImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        OutputFormat::Jpeg => {
            validate_rgba(image)?;
            encode_jpeg(&image.to_rgb_over_white(), image.width, image.height, quality)
        }
        OutputFormat::Png => encode_png(image),
        OutputFormat::WebP => encode_webp(image, quality),
    }
}

/// Check that the image is non-empty and its RGBA buffer matches its dimensions.
pub(crate) fn validate_rgba(image: &DecodedImage) -> Result<(), EncodeError> {
    validate_pixels(&image.pixels, image.width, image.height, 4)
}

fn validate_pixels(
    pixels: &[u8],
    width: u32,
    height: u32,
    channels: usize,
) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * channels;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_image;

    fn gray(width: u32, height: u32) -> DecodedImage {
        DecodedImage::new(
            width,
            height,
            vec![128u8; (width * height * 4) as usize],
            false,
        )
    }

    #[test]
    fn test_preserving_policy() {
        assert_eq!(OutputFormat::preserving(ImageFormatKind::Png), OutputFormat::Png);
        assert_eq!(OutputFormat::preserving(ImageFormatKind::WebP), OutputFormat::WebP);
        assert_eq!(OutputFormat::preserving(ImageFormatKind::Jpeg), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::preserving(ImageFormatKind::Bmp), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::preserving(ImageFormatKind::Gif), OutputFormat::Jpeg);
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Jpeg.extension(), ".jpg");
        assert_eq!(OutputFormat::Png.extension(), ".png");
        assert_eq!(OutputFormat::WebP.mime_type(), "image/webp");
    }

    #[test]
    fn test_encode_each_format_round_trips_dimensions() {
        let img = gray(12, 7);
        for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::WebP] {
            let bytes = encode(&img, format, 80).unwrap();
            let decoded = decode_image(&bytes).unwrap();
            assert_eq!((decoded.width, decoded.height), (12, 7), "{format:?}");
        }
    }

    #[test]
    fn test_encode_rejects_mismatched_buffer() {
        let img = DecodedImage {
            width: 10,
            height: 10,
            pixels: vec![0u8; 10],
            has_alpha: false,
        };
        let result = encode(&img, OutputFormat::Jpeg, 80);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_encode_rejects_zero_dimensions() {
        let img = DecodedImage {
            width: 0,
            height: 10,
            pixels: vec![],
            has_alpha: false,
        };
        for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::WebP] {
            let result = encode(&img, format, 80);
            assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
        }
    }
}
