//! Resampling for the stitch canvas and the compression passes.

use super::{DecodeError, DecodedImage, FilterType};

/// Resample `image` to exactly `width` x `height`.
///
/// Returns `DecodeError::InvalidFormat` for a zero target side and
/// `DecodeError::CorruptedFile` when the pixel buffer doesn't match the
/// recorded size.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }
    if (image.width, image.height) == (width, height) {
        return Ok(image.clone());
    }

    let source = image.to_rgba_image().ok_or_else(|| {
        DecodeError::CorruptedFile(format!(
            "{} bytes of RGBA data for {}x{}",
            image.pixels.len(),
            image.width,
            image.height
        ))
    })?;
    let scaled = image::imageops::resize(&source, width, height, filter.to_image_filter());
    Ok(DecodedImage::from_rgba_image(scaled, image.has_alpha))
}

/// Shrink `image` so its longer edge is at most `max_edge`. Never upscales.
pub fn resize_to_fit(
    image: &DecodedImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::InvalidFormat);
    }
    if image.width.max(image.height) <= max_edge {
        return Ok(image.clone());
    }

    let (width, height) = calculate_fit_dimensions(image.width, image.height, max_edge);
    resize(image, width, height, filter)
}

/// Size of a `width` x `height` image scaled so its longer edge is `max_edge`.
///
/// The shorter edge is rounded to the nearest pixel and kept at least 1.
/// Zero-sized input yields `(0, 0)`.
pub fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let scale = f64::from(max_edge) / f64::from(width.max(height));
    let shorter = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);
    if width >= height {
        (max_edge, shorter(height))
    } else {
        (shorter(width), max_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> DecodedImage {
        let pixels = (0..height)
            .flat_map(|y| {
                (0..width).flat_map(move |x| {
                    [
                        ((x * 255) / width) as u8,
                        ((y * 255) / height) as u8,
                        128,
                        255,
                    ]
                })
            })
            .collect();
        DecodedImage::new(width, height, pixels, false)
    }

    #[test]
    fn test_resize_exact() {
        let resized = resize(&gradient(100, 50), 50, 25, FilterType::Bilinear).unwrap();
        assert_eq!((resized.width, resized.height), (50, 25));
        assert_eq!(resized.pixels.len(), 50 * 25 * 4);
    }

    #[test]
    fn test_resize_can_upscale() {
        // Stitching scales narrow sources up to the canvas width
        let resized = resize(&gradient(50, 25), 100, 50, FilterType::Lanczos3).unwrap();
        assert_eq!((resized.width, resized.height), (100, 50));
    }

    #[test]
    fn test_resize_keeps_alpha_flag() {
        let mut img = gradient(20, 20);
        img.has_alpha = true;
        assert!(resize(&img, 10, 10, FilterType::Nearest).unwrap().has_alpha);
    }

    #[test]
    fn test_zero_targets_rejected() {
        let img = gradient(100, 50);
        assert!(resize(&img, 0, 50, FilterType::Bilinear).is_err());
        assert!(resize(&img, 50, 0, FilterType::Bilinear).is_err());
        assert!(resize_to_fit(&img, 0, FilterType::Bilinear).is_err());
    }

    #[test]
    fn test_mismatched_buffer_is_corrupted() {
        let img = DecodedImage {
            width: 4,
            height: 4,
            pixels: vec![0; 12],
            has_alpha: false,
        };
        assert!(matches!(
            resize(&img, 2, 2, FilterType::Nearest),
            Err(DecodeError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_fit_first_pass_landscape() {
        let resized = resize_to_fit(&gradient(3000, 2000), 2560, FilterType::Bilinear).unwrap();
        assert_eq!((resized.width, resized.height), (2560, 1707));
    }

    #[test]
    fn test_fit_second_pass_portrait() {
        let resized = resize_to_fit(&gradient(1000, 3000), 1920, FilterType::Bilinear).unwrap();
        assert_eq!((resized.width, resized.height), (640, 1920));
    }

    #[test]
    fn test_fit_never_upscales() {
        let resized = resize_to_fit(&gradient(100, 50), 256, FilterType::Bilinear).unwrap();
        assert_eq!((resized.width, resized.height), (100, 50));
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(calculate_fit_dimensions(6000, 4000, 2560), (2560, 1707));
        assert_eq!(calculate_fit_dimensions(4000, 6000, 2560), (1707, 2560));
        assert_eq!(calculate_fit_dimensions(2000, 2000, 1920), (1920, 1920));
        assert_eq!(calculate_fit_dimensions(10000, 2, 1920), (1920, 1));
        assert_eq!(calculate_fit_dimensions(0, 0, 256), (0, 0));
    }
}
