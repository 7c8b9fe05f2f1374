//! Error types for the request layer.

use pintu_core::{DecodeError, StitchError};
use thiserror::Error;

use crate::source::SourceRef;

/// Failure reported by a storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The addressed object or record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected or failed the operation.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Failure reported by an identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    Missing,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid API key")]
    InvalidApiKey,
}

/// Failure fetching a remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("Download timed out after {0}s")]
    Timeout(u64),

    #[error("Response of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors surfaced by [`crate::CollageService`] flows.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request itself is malformed or exceeds a caller bound.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Nothing to stitch.
    #[error("{0}")]
    EmptyInput(String),

    /// An uploaded buffer is not a readable image.
    #[error("Uploaded file is not a readable image: {0}")]
    Decode(#[from] DecodeError),

    /// A source could not be retrieved; `index` is its position in the request.
    #[error("Failed to fetch image #{index} ({reference}): {reason}")]
    Fetch {
        index: usize,
        reference: SourceRef,
        reason: String,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Stitch(#[from] StitchError),

    /// A blocking pipeline task panicked or was cancelled.
    #[error("Pipeline task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ServiceError {
    /// True for errors caused by the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        match self {
            ServiceError::Validation(_)
            | ServiceError::EmptyInput(_)
            | ServiceError::Decode(_)
            | ServiceError::Fetch { .. }
            | ServiceError::NotFound(_)
            | ServiceError::Unauthorized(_) => true,
            ServiceError::Stitch(err) => matches!(
                err,
                StitchError::EmptyInput
                    | StitchError::DecodeFailure { .. }
                    | StitchError::CanvasTooLarge { .. }
            ),
            ServiceError::Store(_) | ServiceError::Join(_) => false,
        }
    }
}
