//! End-to-end scenarios across the stitch and compress stages.

use std::io::Cursor;

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ImageEncoder, ImageFormat, Rgb, RgbImage};
use pintu_core::compress::DEFAULT_THRESHOLD_BYTES;
use pintu_core::{
    compress, probe, stitch, CompressionPolicy, CompressionStatus, Direction, ImageFormatKind,
    PipelineConfig, StitchError,
};

fn png(img: RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn jpeg(img: RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

#[test]
fn two_images_stitched_right_share_first_height() {
    let config = PipelineConfig::default();
    let sources = vec![
        png(RgbImage::from_pixel(800, 600, Rgb([255, 0, 0]))),
        jpeg(RgbImage::from_pixel(1200, 600, Rgb([0, 0, 255]))),
    ];

    let result = stitch(&sources, Direction::Right, &config.stitch).unwrap();
    assert_eq!((result.width, result.height), (2000, 600));

    let meta = probe(&result.bytes).unwrap();
    assert_eq!(meta.format, ImageFormatKind::Jpeg);
    assert_eq!((meta.width, meta.height), (2000, 600));
}

#[test]
fn mixed_widths_stitched_down_match_analytic_size() {
    let config = PipelineConfig::default();
    let sources = vec![
        png(RgbImage::from_pixel(300, 100, Rgb([10, 10, 10]))),
        png(RgbImage::from_pixel(600, 90, Rgb([20, 20, 20]))),
        png(RgbImage::from_pixel(150, 151, Rgb([30, 30, 30]))),
    ];

    let result = stitch(&sources, Direction::Down, &config.stitch).unwrap();
    // 100 + round(90 * 300 / 600) + round(151 * 300 / 150) = 100 + 45 + 302
    assert_eq!((result.width, result.height), (300, 447));
}

#[test]
fn empty_stitch_is_rejected() {
    let config = PipelineConfig::default();
    let sources: Vec<Vec<u8>> = Vec::new();
    assert!(matches!(
        stitch(&sources, Direction::Down, &config.stitch),
        Err(StitchError::EmptyInput)
    ));
    assert!(matches!(
        stitch(&sources, Direction::Right, &config.stitch),
        Err(StitchError::EmptyInput)
    ));
}

#[test]
fn oversized_png_upload_stays_png_under_default_budget() {
    let img = RgbImage::from_fn(1000, 2000, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) / 8 % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    PngEncoder::new_with_quality(&mut buf, CompressionType::Fast, PngFilter::NoFilter)
        .write_image(img.as_raw(), 1000, 2000, image::ExtendedColorType::Rgb8)
        .unwrap();
    let input = buf.into_inner();

    // The upload layer reports 6 MB for this file
    let declared = 6 * 1024 * 1024;
    let outcome = compress(input, declared, ".png", &CompressionPolicy::default());

    assert!(outcome.size <= DEFAULT_THRESHOLD_BYTES);
    assert_eq!(outcome.extension, ".png");
    let meta = probe(&outcome.bytes).unwrap();
    assert_eq!(meta.format, ImageFormatKind::Png);
    assert_eq!((meta.width, meta.height), (1000, 2000));
    assert!(matches!(
        outcome.status,
        CompressionStatus::Compressed { passes: 1, within_budget: true, .. }
    ));
}

#[test]
fn compressed_upload_can_be_stitched() {
    let big = png(RgbImage::from_fn(640, 480, |x, y| {
        Rgb([(x / 3) as u8, (y / 2) as u8, 128])
    }));
    let policy = CompressionPolicy {
        threshold_bytes: 1,
        ..CompressionPolicy::default()
    };
    let outcome = compress(big.clone(), big.len() as u64, ".png", &policy);

    let small = png(RgbImage::from_pixel(320, 100, Rgb([0, 200, 0])));
    let result = stitch(
        &[outcome.bytes, small],
        Direction::Down,
        &PipelineConfig::default().stitch,
    )
    .unwrap();
    assert_eq!((result.width, result.height), (640, 680));
}
