//! Canvas allocation and compositing.

use image::{Rgb, RgbImage};

use super::Placement;
use crate::decode::{resize, DecodeError, DecodedImage, FilterType};

/// Opaque white; transparent source regions composite onto this.
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// A white RGB canvas of the given size.
///
/// The output is JPEG, so the canvas carries no alpha channel.
pub(super) fn white_canvas(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, BACKGROUND)
}

/// Blend one straight-alpha channel over white.
fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (u32::from(channel), u32::from(alpha));
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Resize `image` to its placement size and blend it onto the canvas.
pub(super) fn place(
    canvas: &mut RgbImage,
    image: &DecodedImage,
    placement: &Placement,
    filter: FilterType,
) -> Result<(), DecodeError> {
    let scaled = resize(image, placement.width, placement.height, filter)?;
    let layer = scaled
        .into_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Pixel buffer size mismatch".to_string()))?;

    for (x, y, pixel) in layer.enumerate_pixels() {
        let Some(target) =
            canvas.get_pixel_mut_checked(placement.offset_x + x, placement.offset_y + y)
        else {
            continue;
        };
        let [r, g, b, a] = pixel.0;
        *target = Rgb([over_white(r, a), over_white(g, a), over_white(b, a)]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_canvas() {
        let canvas = white_canvas(3, 2);
        assert_eq!(canvas.as_raw().len(), 3 * 2 * 3);
        assert!(canvas.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn test_over_white() {
        assert_eq!(over_white(0, 0), 255);
        assert_eq!(over_white(10, 255), 10);
        assert_eq!(over_white(0, 128), 127);
    }

    #[test]
    fn test_place_blends_transparent_onto_white() {
        let mut canvas = white_canvas(4, 4);
        let clear = DecodedImage::new(2, 2, [0u8, 0, 0, 0].repeat(4), true);
        let placement = Placement { width: 4, height: 2, offset_x: 0, offset_y: 2 };

        place(&mut canvas, &clear, &placement, FilterType::Nearest).unwrap();
        assert!(canvas.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn test_place_at_offset() {
        let mut canvas = white_canvas(2, 4);
        let red = DecodedImage::new(1, 1, vec![255, 0, 0, 255], false);
        let placement = Placement { width: 2, height: 2, offset_x: 0, offset_y: 2 };

        place(&mut canvas, &red, &placement, FilterType::Nearest).unwrap();
        assert_eq!(*canvas.get_pixel(0, 1), BACKGROUND);
        assert_eq!(*canvas.get_pixel(0, 2), Rgb([255, 0, 0]));
        assert_eq!(*canvas.get_pixel(1, 3), Rgb([255, 0, 0]));
    }
}
