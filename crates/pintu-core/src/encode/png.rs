//! PNG encoding at the maximum lossless compression level.

use std::io::Cursor;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use super::{validate_rgba, EncodeError};
use crate::decode::DecodedImage;

/// Encode an image as PNG using best deflate compression and adaptive filtering.
///
/// Images that carried an alpha channel are written as RGBA; opaque images are
/// written as RGB, which keeps transparency where it existed without paying
/// for a constant alpha plane.
pub fn encode_png(image: &DecodedImage) -> Result<Vec<u8>, EncodeError> {
    validate_rgba(image)?;

    let mut buffer = Cursor::new(Vec::new());
    let encoder =
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive);

    let result = if image.has_alpha {
        encoder.write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        )
    } else {
        let rgb = strip_alpha(&image.pixels);
        encoder.write_image(&rgb, image.width, image.height, ExtendedColorType::Rgb8)
    };

    result.map_err(|e| EncodeError::EncodingFailed {
        format: "PNG",
        reason: e.to_string(),
    })?;

    Ok(buffer.into_inner())
}

pub(super) fn strip_alpha(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_image;

    #[test]
    fn test_png_signature() {
        let img = DecodedImage::new(8, 8, vec![200u8; 8 * 8 * 4], false);
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_png_preserves_transparency() {
        let pixels = [10u8, 20, 30, 0].repeat(4 * 4);
        let img = DecodedImage::new(4, 4, pixels, true);

        let decoded = decode_image(&encode_png(&img).unwrap()).unwrap();
        assert!(decoded.has_alpha);
        assert_eq!(&decoded.pixels[0..4], &[10, 20, 30, 0]);
    }

    #[test]
    fn test_png_opaque_written_without_alpha() {
        let img = DecodedImage::new(4, 4, vec![255u8; 4 * 4 * 4], false);
        let decoded = decode_image(&encode_png(&img).unwrap()).unwrap();
        assert!(!decoded.has_alpha);
    }

    #[test]
    fn test_strip_alpha() {
        assert_eq!(strip_alpha(&[1, 2, 3, 4, 5, 6, 7, 8]), vec![1, 2, 3, 5, 6, 7]);
    }
}
