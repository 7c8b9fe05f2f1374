//! Image decoding for the Pintu pipeline.
//!
//! This module provides functionality for:
//! - Sniffing the container format and reading header dimensions
//! - Decoding PNG, JPEG, WebP, GIF and BMP buffers to RGBA
//! - Aspect-preserving resizing used by both stitching and compression
//!
//! All operations are synchronous and operate on in-memory buffers.
//!
//! # Examples
//!
//! ```ignore
//! use pintu_core::decode::{decode_image, probe};
//!
//! let bytes = std::fs::read("photo.png").unwrap();
//! let meta = probe(&bytes).unwrap();
//! let image = decode_image(&bytes).unwrap();
//! assert_eq!((meta.width, meta.height), (image.width, image.height));
//! ```

mod probe;
mod resize;
mod types;

pub use probe::{decode_image, detect_format, probe};
pub use resize::{calculate_fit_dimensions, resize, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType, ImageFormatKind, ImageMetadata};
