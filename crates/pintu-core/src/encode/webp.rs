//! Lossy WebP encoding through libwebp.

use ::webp::Encoder;

use super::png::strip_alpha;
use super::{validate_rgba, EncodeError};
use crate::decode::DecodedImage;

/// Encode an image as lossy WebP at `quality` (1-100, clamped).
///
/// The alpha plane is kept, and stored losslessly, when the source had one.
pub fn encode_webp(image: &DecodedImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    validate_rgba(image)?;
    let quality = f32::from(quality.clamp(1, 100));

    let rgb;
    let encoder = if image.has_alpha {
        Encoder::from_rgba(&image.pixels, image.width, image.height)
    } else {
        rgb = strip_alpha(&image.pixels);
        Encoder::from_rgb(&rgb, image.width, image.height)
    };

    let memory = encoder
        .encode_simple(false, quality)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "WebP",
            reason: format!("{e:?}"),
        })?;

    Ok(memory.to_vec())
}
