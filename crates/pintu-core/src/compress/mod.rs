//! Upload compression: bring oversized images under a byte budget.
//!
//! Runs only when the declared size exceeds the budget:
//!
//! 1. Fit within `first_pass.max_edge` (never upscaling) and re-encode in a
//!    format-preserving way: PNG stays PNG, WebP stays WebP, everything else
//!    becomes JPEG at `first_pass.quality`.
//! 2. If that is still over budget, fit within `second_pass.max_edge` and
//!    force JPEG at `second_pass.quality`.
//!
//! Compression never blocks an upload. Any failure, or a result that is not
//! smaller than the input, returns the original bytes, size and extension.

mod policy;

use thiserror::Error;

use crate::decode::{decode_image, probe, resize_to_fit, DecodeError};
use crate::encode::{encode, EncodeError, OutputFormat};

pub use policy::{CompressionPass, CompressionPolicy, DEFAULT_THRESHOLD_BYTES};

/// Why compression fell back to the original buffer.
#[derive(Debug, Error)]
pub enum CompressionFailure {
    #[error("cannot decode upload: {0}")]
    Decode(#[from] DecodeError),

    #[error("cannot re-encode upload: {0}")]
    Encode(#[from] EncodeError),

    #[error("re-encoded size {compressed} is not smaller than original {original}")]
    NotSmaller { original: u64, compressed: u64 },
}

/// What happened to a buffer.
#[derive(Debug)]
pub enum CompressionStatus {
    /// Under budget; returned untouched.
    Skipped,
    /// Re-encoded. `within_budget` is false when even the second pass could not
    /// reach the threshold; the smaller output is still used.
    Compressed {
        passes: u8,
        format: OutputFormat,
        within_budget: bool,
    },
    /// Compression failed; the original buffer was kept.
    Fallback(CompressionFailure),
}

/// Result of [`compress`]: the buffer to persist plus its size and extension.
#[derive(Debug)]
pub struct CompressionOutcome {
    pub bytes: Vec<u8>,
    pub size: u64,
    pub extension: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub status: CompressionStatus,
}

impl CompressionOutcome {
    fn original(
        buffer: Vec<u8>,
        declared_size: u64,
        extension: &str,
        status: CompressionStatus,
    ) -> Self {
        Self {
            bytes: buffer,
            size: declared_size,
            extension: extension.to_string(),
            width: None,
            height: None,
            status,
        }
    }

    /// True when the returned bytes differ from the input.
    pub fn is_compressed(&self) -> bool {
        matches!(self.status, CompressionStatus::Compressed { .. })
    }
}

/// Compress `buffer` if `declared_size` exceeds the policy threshold.
///
/// `extension` is the upload's file extension (`".png"` or `"png"`); it is kept
/// when the output format still matches it and replaced otherwise.
pub fn compress(
    buffer: Vec<u8>,
    declared_size: u64,
    extension: &str,
    policy: &CompressionPolicy,
) -> CompressionOutcome {
    if !policy.exceeds(declared_size) {
        return CompressionOutcome::original(
            buffer,
            declared_size,
            extension,
            CompressionStatus::Skipped,
        );
    }

    log::info!(
        "Compressing upload: {} bytes exceeds {} byte budget",
        declared_size,
        policy.threshold_bytes
    );

    match reencode(&buffer, extension, policy) {
        Ok(outcome) if outcome.size < buffer.len() as u64 => {
            log::info!(
                "Compressed upload {} -> {} bytes ({:?})",
                declared_size,
                outcome.size,
                outcome.status
            );
            outcome
        }
        Ok(outcome) => {
            let failure = CompressionFailure::NotSmaller {
                original: buffer.len() as u64,
                compressed: outcome.size,
            };
            log::warn!("Keeping original upload: {failure}");
            let status = CompressionStatus::Fallback(failure);
            CompressionOutcome::original(buffer, declared_size, extension, status)
        }
        Err(failure) => {
            log::warn!("Upload compression failed, keeping original: {failure}");
            let status = CompressionStatus::Fallback(failure);
            CompressionOutcome::original(buffer, declared_size, extension, status)
        }
    }
}

fn reencode(
    buffer: &[u8],
    extension: &str,
    policy: &CompressionPolicy,
) -> Result<CompressionOutcome, CompressionFailure> {
    let meta = probe(buffer)?;
    let image = decode_image(buffer)?;

    let first = policy.first_pass;
    let fitted = resize_to_fit(&image, first.max_edge, policy.filter)?;
    let mut format = OutputFormat::preserving(meta.format);
    let mut bytes = encode(&fitted, format, first.quality)?;
    let (mut width, mut height) = (fitted.width, fitted.height);
    let mut passes = 1;

    log::debug!(
        "First pass: {}x{} {:?} -> {}x{} {:?}, {} bytes",
        meta.width,
        meta.height,
        meta.format,
        width,
        height,
        format,
        bytes.len()
    );

    if policy.exceeds(bytes.len() as u64) {
        let second = policy.second_pass;
        let fitted = resize_to_fit(&fitted, second.max_edge, policy.filter)?;
        format = OutputFormat::Jpeg;
        bytes = encode(&fitted, format, second.quality)?;
        (width, height) = (fitted.width, fitted.height);
        passes = 2;

        log::debug!("Second pass: {}x{} JPEG, {} bytes", width, height, bytes.len());
    }

    let within_budget = !policy.exceeds(bytes.len() as u64);
    Ok(CompressionOutcome {
        size: bytes.len() as u64,
        bytes,
        extension: extension_for(format, extension),
        width: Some(width),
        height: Some(height),
        status: CompressionStatus::Compressed {
            passes,
            format,
            within_budget,
        },
    })
}

/// Keep the caller's extension if it already names `format`, otherwise use the canonical one.
pub fn extension_for(format: OutputFormat, original: &str) -> String {
    let normalized = original.trim_start_matches('.').to_ascii_lowercase();
    let matches = match format {
        OutputFormat::Jpeg => matches!(normalized.as_str(), "jpg" | "jpeg" | "jpe" | "jfif"),
        OutputFormat::Png => normalized == "png",
        OutputFormat::WebP => normalized == "webp",
    };

    if matches {
        format!(".{normalized}")
    } else {
        format.extension().to_string()
    }
}
