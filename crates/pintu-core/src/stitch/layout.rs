//! Pure layout geometry for stitched canvases.
//!
//! The first image fixes the cross-axis length (width for `Down`, height for
//! `Right`); every image is scaled to that length and placed back-to-back along
//! the stitch axis. The along-axis length computed here is used both as the
//! resize target and as the placement advance, so offsets never drift.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{StitchError, StitchSettings};

/// Axis along which images are concatenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Vertical: fixed width, heights accumulate.
    #[default]
    Down,
    /// Horizontal: fixed height, widths accumulate.
    Right,
}

/// A direction string other than `down` or `right`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown stitch direction {0:?} (expected \"down\" or \"right\")")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "down" => Ok(Direction::Down),
            "right" => Ok(Direction::Right),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Down => f.write_str("down"),
            Direction::Right => f.write_str("right"),
        }
    }
}

/// Where one source lands on the canvas, at its scaled size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub width: u32,
    pub height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

/// Placements for every source plus the total canvas size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeLayout {
    pub direction: Direction,
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement>,
}

impl CompositeLayout {
    /// Total canvas pixel area.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Along-axis length of an image scaled so its cross-axis equals `fixed`.
///
/// `round(along * fixed / cross)`, floored at one pixel so a sliver never
/// collapses to an unrenderable zero-length placement.
pub fn scaled_length(along: u32, fixed: u32, cross: u32) -> u32 {
    let cross = cross.max(1);
    let scaled = (f64::from(along) * f64::from(fixed) / f64::from(cross)).round();
    (scaled as u32).max(1)
}

fn known(dimensions: Option<(u32, u32)>, fallback: (u32, u32)) -> (u32, u32) {
    let (width, height) = dimensions.unwrap_or((0, 0));
    (
        if width == 0 { fallback.0 } else { width },
        if height == 0 { fallback.1 } else { height },
    )
}

/// Compute the canvas layout for sources with the given (possibly unknown) dimensions.
///
/// Unknown first-image dimensions fall back to `settings.fallback_width` x
/// `settings.fallback_height`; unknown dimensions of any image fall back to
/// `settings.missing_dimension` on each missing side.
///
/// # Errors
///
/// `StitchError::EmptyInput` for an empty list and `StitchError::CanvasTooLarge`
/// if the accumulated length overflows `u32`.
pub fn compute_layout(
    dimensions: &[Option<(u32, u32)>],
    direction: Direction,
    settings: &StitchSettings,
) -> Result<CompositeLayout, StitchError> {
    let first = dimensions.first().ok_or(StitchError::EmptyInput)?;
    let (base_width, base_height) =
        known(*first, (settings.fallback_width, settings.fallback_height));
    let missing = (settings.missing_dimension, settings.missing_dimension);

    let lengths: Vec<u32> = dimensions
        .iter()
        .map(|dims| {
            let (width, height) = known(*dims, missing);
            match direction {
                Direction::Down => scaled_length(height, base_width, width),
                Direction::Right => scaled_length(width, base_height, height),
            }
        })
        .collect();

    let along: u64 = lengths.iter().map(|&len| u64::from(len)).sum();
    let (width, height) = match direction {
        Direction::Down => (u64::from(base_width), along),
        Direction::Right => (along, u64::from(base_height)),
    };
    if along > u64::from(u32::MAX) {
        return Err(StitchError::CanvasTooLarge { width, height });
    }

    // Every offset is bounded by `along`, which fits in u32.
    let mut offset = 0u32;
    let placements = lengths
        .into_iter()
        .map(|len| {
            let placement = match direction {
                Direction::Down => Placement {
                    width: base_width,
                    height: len,
                    offset_x: 0,
                    offset_y: offset,
                },
                Direction::Right => Placement {
                    width: len,
                    height: base_height,
                    offset_x: offset,
                    offset_y: 0,
                },
            };
            offset += len;
            placement
        })
        .collect();

    Ok(CompositeLayout {
        direction,
        width: width as u32,
        height: height as u32,
        placements,
    })
}
