//! Format sniffing, header probing and full decoding of encoded buffers.

use std::io::Cursor;

use image::ImageReader;

use super::{DecodeError, DecodedImage, ImageFormatKind, ImageMetadata};

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }
    Ok(reader)
}

/// Read format and pixel dimensions from the image header.
///
/// Only the header is parsed, so this is cheap even for large uploads.
/// Dimensions are reported as stored; no orientation correction is applied.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for an empty buffer, `DecodeError::InvalidFormat`
/// if no known signature matches, and `DecodeError::CorruptedFile` if the header
/// cannot be read.
pub fn probe(bytes: &[u8]) -> Result<ImageMetadata, DecodeError> {
    let reader = reader(bytes)?;
    let format = reader
        .format()
        .map(ImageFormatKind::from)
        .ok_or(DecodeError::InvalidFormat)?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    Ok(ImageMetadata {
        width,
        height,
        format,
    })
}

/// Detect the container format without reading dimensions.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormatKind> {
    image::guess_format(bytes).ok().map(ImageFormatKind::from)
}

/// Decode an encoded image into RGBA pixels.
///
/// # Errors
///
/// Same conditions as [`probe`], plus `DecodeError::CorruptedFile` when the
/// pixel data itself is truncated or malformed.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let img = reader(bytes)?
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    Ok(DecodedImage::from_dynamic(img))
}
