//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The buffer is empty.
    #[error("Image buffer is empty")]
    Empty,

    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    #[default]
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Container format detected from the leading bytes of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormatKind {
    Png,
    Jpeg,
    WebP,
    Gif,
    Bmp,
    /// Decodable by the image crate but without a dedicated re-encode path.
    Other,
}

impl ImageFormatKind {
    /// Canonical file extension (with leading dot).
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormatKind::Png => ".png",
            ImageFormatKind::Jpeg => ".jpg",
            ImageFormatKind::WebP => ".webp",
            ImageFormatKind::Gif => ".gif",
            ImageFormatKind::Bmp => ".bmp",
            ImageFormatKind::Other => "",
        }
    }

    /// MIME type suitable for a storage `Content-Type`.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormatKind::Png => "image/png",
            ImageFormatKind::Jpeg => "image/jpeg",
            ImageFormatKind::WebP => "image/webp",
            ImageFormatKind::Gif => "image/gif",
            ImageFormatKind::Bmp => "image/bmp",
            ImageFormatKind::Other => "application/octet-stream",
        }
    }
}

impl From<image::ImageFormat> for ImageFormatKind {
    fn from(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Png => ImageFormatKind::Png,
            image::ImageFormat::Jpeg => ImageFormatKind::Jpeg,
            image::ImageFormat::WebP => ImageFormatKind::WebP,
            image::ImageFormat::Gif => ImageFormatKind::Gif,
            image::ImageFormat::Bmp => ImageFormatKind::Bmp,
            _ => ImageFormatKind::Other,
        }
    }
}

/// Header-level information about an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Detected container format.
    pub format: ImageFormatKind,
}

impl ImageMetadata {
    /// Length of the longer edge.
    pub fn max_edge(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Total pixel area, widened so large canvases cannot overflow.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A decoded image with RGBA pixel data.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
    /// Whether the source carried an alpha channel.
    pub has_alpha: bool,
}

impl DecodedImage {
    /// Create a new DecodedImage with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, has_alpha: bool) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
            has_alpha,
        }
    }

    /// Create a DecodedImage from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage, has_alpha: bool) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
            has_alpha,
        }
    }

    /// Create a DecodedImage from any decoded image, remembering its alpha channel.
    pub fn from_dynamic(img: image::DynamicImage) -> Self {
        let has_alpha = img.color().has_alpha();
        Self::from_rgba_image(img.into_rgba8(), has_alpha)
    }

    /// Convert to an image::RgbaImage for further processing.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Consume into an image::RgbaImage without copying the pixel buffer.
    pub fn into_rgba_image(self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels)
    }

    /// RGB pixel data with alpha composited over opaque white.
    pub fn to_rgb_over_white(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixels.len() / 4 * 3);
        for px in self.pixels.chunks_exact(4) {
            let alpha = u16::from(px[3]);
            for &channel in &px[..3] {
                let blended = (u16::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255;
                rgb.push(blended as u8);
            }
        }
        rgb
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
