//! Stitching engine: concatenate an ordered list of images into one canvas.
//!
//! # Algorithm
//!
//! 1. Reject an empty list.
//! 2. Probe every source header. The first image's dimensions fix the
//!    cross-axis length (canvas width for `Down`, canvas height for `Right`).
//! 3. Compute each image's along-axis length once (see [`compute_layout`]) and
//!    use it for both the resize target and the running offset.
//! 4. Allocate a white RGB canvas, then decode, resize and composite each
//!    source in request order. Only one decoded source is alive at a time.
//! 5. Encode the canvas as baseline JPEG.
//!
//! There is no partial result: any source that cannot be decoded fails the
//! whole stitch with its index.

mod canvas;
mod layout;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{decode_image, probe, DecodeError, FilterType};
use crate::encode::{encode_jpeg, EncodeError, OutputFormat};

pub use layout::{
    compute_layout, scaled_length, CompositeLayout, Direction, ParseDirectionError, Placement,
};

/// Largest width or height a baseline JPEG can describe.
pub const MAX_JPEG_DIMENSION: u32 = 65_535;

/// Errors that can occur while stitching.
#[derive(Debug, Error)]
pub enum StitchError {
    /// No sources were supplied.
    #[error("No images to stitch")]
    EmptyInput,

    /// A source could not be interpreted as an image.
    #[error("Failed to decode image #{index}: {source}")]
    DecodeFailure {
        index: usize,
        #[source]
        source: DecodeError,
    },

    /// The composed canvas cannot be represented in the output format.
    #[error("Stitched canvas {width}x{height} exceeds the 65535px output limit")]
    CanvasTooLarge { width: u64, height: u64 },

    /// Encoding the finished canvas failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Tunables for the stitching engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchSettings {
    /// Baseline width used when the first image's size is unknown.
    pub fallback_width: u32,
    /// Baseline height used when the first image's size is unknown.
    pub fallback_height: u32,
    /// Substitute for any unknown side of a later image.
    pub missing_dimension: u32,
    /// JPEG quality of the stitched output (1-100).
    pub quality: u8,
    /// Resampling filter used to scale sources onto the cross-axis.
    pub filter: FilterType,
}

impl Default for StitchSettings {
    fn default() -> Self {
        Self {
            fallback_width: 1080,
            fallback_height: 1920,
            missing_dimension: 100,
            quality: 80,
            filter: FilterType::Lanczos3,
        }
    }
}

/// The encoded result of a stitch.
#[derive(Debug, Clone)]
pub struct StitchedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

/// Probe every source and compute the canvas layout without decoding pixels.
///
/// # Errors
///
/// `StitchError::EmptyInput`, `StitchError::DecodeFailure` for an unreadable
/// header, or `StitchError::CanvasTooLarge`.
pub fn plan_layout<S: AsRef<[u8]>>(
    sources: &[S],
    direction: Direction,
    settings: &StitchSettings,
) -> Result<CompositeLayout, StitchError> {
    if sources.is_empty() {
        return Err(StitchError::EmptyInput);
    }

    let dimensions = sources
        .iter()
        .enumerate()
        .map(|(index, bytes)| {
            probe(bytes.as_ref())
                .map(|meta| Some((meta.width, meta.height)))
                .map_err(|source| StitchError::DecodeFailure { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let layout = compute_layout(&dimensions, direction, settings)?;
    if layout.width > MAX_JPEG_DIMENSION || layout.height > MAX_JPEG_DIMENSION {
        return Err(StitchError::CanvasTooLarge {
            width: u64::from(layout.width),
            height: u64::from(layout.height),
        });
    }
    Ok(layout)
}

/// Stitch encoded images, in order, into one JPEG.
///
/// # Errors
///
/// See [`StitchError`]. Any failure aborts the whole stitch.
pub fn stitch<S: AsRef<[u8]>>(
    sources: &[S],
    direction: Direction,
    settings: &StitchSettings,
) -> Result<StitchedImage, StitchError> {
    let started = Instant::now();
    let layout = plan_layout(sources, direction, settings)?;

    log::debug!(
        "Stitching {} images {} into {}x{} canvas",
        sources.len(),
        direction,
        layout.width,
        layout.height
    );

    let mut canvas = canvas::white_canvas(layout.width, layout.height);
    for (index, (bytes, placement)) in sources.iter().zip(&layout.placements).enumerate() {
        let decoded = decode_image(bytes.as_ref())
            .map_err(|source| StitchError::DecodeFailure { index, source })?;
        canvas::place(&mut canvas, &decoded, placement, settings.filter)
            .map_err(|source| StitchError::DecodeFailure { index, source })?;
    }

    let bytes = encode_jpeg(canvas.as_raw(), layout.width, layout.height, settings.quality)?;

    log::debug!(
        "Stitched {}x{} ({} bytes) in {:?}",
        layout.width,
        layout.height,
        bytes.len(),
        started.elapsed()
    );

    Ok(StitchedImage {
        bytes,
        width: layout.width,
        height: layout.height,
        format: OutputFormat::Jpeg,
    })
}
