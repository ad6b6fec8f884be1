//! Source map generation errors

use thiserror::Error;

/// Errors raised while building, encoding, or verifying a source map.
///
/// Every variant except [`SourceMapError::Json`] signals a bug in the caller
/// (a code generator or a test), not bad input data. None of them are worth
/// retrying: the map for the current output file should be abandoned.
#[derive(Debug, Error)]
pub enum SourceMapError {
    /// A write would move the generated column past the largest column a map can hold
    #[error("Invalid write length {length} at generated column {column}")]
    InvalidLength {
        /// Requested write length in characters
        length: usize,
        /// Generated column the write started at
        column: u32,
    },

    /// Begin/end attribution events do not nest
    #[error("Unbalanced attribution: {0}")]
    UnbalancedAttribution(String),

    /// An event arrived after the builder was finalized
    #[error("Source map builder already finalized")]
    AlreadyFinalized,

    /// VLQ text could not be decoded
    #[error("Malformed VLQ at offset {offset}: {message}")]
    MalformedVlq {
        /// Byte offset into the decoded text
        offset: usize,
        /// What went wrong
        message: &'static str,
    },

    /// A hand-built map violates a table or ordering invariant
    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    /// JSON serialization of the wire document failed
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SourceMapError {
    /// Create an unbalanced attribution error
    pub fn unbalanced(message: impl Into<String>) -> Self {
        Self::UnbalancedAttribution(message.into())
    }

    /// Create an invalid mapping error
    pub fn invalid_mapping(message: impl Into<String>) -> Self {
        Self::InvalidMapping(message.into())
    }

    /// Create a malformed VLQ error
    pub fn malformed_vlq(offset: usize, message: &'static str) -> Self {
        Self::MalformedVlq { offset, message }
    }
}

/// Result type for source map operations
pub type SourceMapResult<T> = Result<T, SourceMapError>;
