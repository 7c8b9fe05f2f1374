//! Size budget and tiered re-encode settings for upload compression.

use serde::{Deserialize, Serialize};

use crate::decode::FilterType;

/// Default budget: 4.5 MiB.
pub const DEFAULT_THRESHOLD_BYTES: u64 = 4_718_592;

/// One re-encode pass: fit within `max_edge` x `max_edge`, then encode at `quality`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionPass {
    pub max_edge: u32,
    pub quality: u8,
}

/// When and how hard uploads are compressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionPolicy {
    /// Buffers larger than this many bytes are compressed.
    pub threshold_bytes: u64,
    /// Format-preserving pass.
    pub first_pass: CompressionPass,
    /// Forced JPEG pass, run only if the first pass is still over budget.
    pub second_pass: CompressionPass,
    /// Downscale filter for both passes.
    pub filter: FilterType,
}

impl Default for CompressionPolicy {
    fn default() -> Self {
        Self {
            threshold_bytes: DEFAULT_THRESHOLD_BYTES,
            first_pass: CompressionPass {
                max_edge: 2560,
                quality: 80,
            },
            second_pass: CompressionPass {
                max_edge: 1920,
                quality: 70,
            },
            filter: FilterType::Lanczos3,
        }
    }
}

impl CompressionPolicy {
    /// Whether a buffer of `size` bytes is over budget.
    pub fn exceeds(&self, size: u64) -> bool {
        size > self.threshold_bytes
    }

    /// Check invariants between the two passes.
    pub fn validate(&self) -> Result<(), String> {
        for (name, pass) in [("first_pass", self.first_pass), ("second_pass", self.second_pass)] {
            if pass.max_edge == 0 {
                return Err(format!("compression.{name}.max_edge must be non-zero"));
            }
            if !(1..=100).contains(&pass.quality) {
                return Err(format!(
                    "compression.{name}.quality must be 1-100, got {}",
                    pass.quality
                ));
            }
        }
        if self.second_pass.max_edge > self.first_pass.max_edge {
            return Err(format!(
                "compression.second_pass.max_edge ({}) must not exceed first_pass.max_edge ({})",
                self.second_pass.max_edge, self.first_pass.max_edge
            ));
        }
        Ok(())
    }
}
