//! Pintu Core - image assembly and upload compression
//!
//! This crate provides the pure, synchronous part of Pintu: turning an ordered
//! list of encoded images into one gapless long image, and shrinking oversized
//! uploads before they are stored.
//!
//! - [`stitch`] - layout computation and compositing (`down` / `right`)
//! - [`compress`] - budgeted, format-aware re-encoding with a two-pass fallback
//! - [`decode`] / [`encode`] - shared probing, decoding, resizing and encoding
//! - [`config`] - the explicit configuration value passed into both stages
//!
//! Every function operates on in-memory buffers owned by the caller and holds
//! no state between calls, so requests may run concurrently.

pub mod compress;
pub mod config;
pub mod decode;
pub mod encode;
pub mod stitch;

pub use compress::{
    compress, CompressionFailure, CompressionOutcome, CompressionPolicy, CompressionStatus,
};
pub use config::{ConfigError, PipelineConfig};
pub use decode::{probe, DecodeError, ImageFormatKind, ImageMetadata};
pub use encode::{EncodeError, OutputFormat};
pub use stitch::{
    compute_layout, plan_layout, stitch, CompositeLayout, Direction, StitchError, StitchSettings,
    StitchedImage,
};
