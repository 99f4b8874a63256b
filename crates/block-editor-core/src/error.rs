//! Error types shared by the block store, the dispatcher and the persistence layer.

use crate::block::BlockId;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while editing a block document.
pub enum EditorError {
    #[error("invalid argument: {0}")]
    /// A caller passed an unrecognized enum-like parameter (e.g. an unknown insertion level).
    InvalidArgument(String),

    #[error("block not found: {0}")]
    /// A lookup by block id found no match.
    NotFound(BlockId),

    #[error("index {index} out of bounds for a document of {len} blocks")]
    /// A positional store operation was given an index outside the document.
    IndexOutOfBounds {
        /// The rejected index.
        index: usize,
        /// Document length at the time of the call.
        len: usize,
    },

    #[error("invalid operation: {0}")]
    /// The operation would break a document invariant (e.g. removing the last block).
    InvalidOperation(&'static str),

    #[error("an event arrived before the previous paint was committed")]
    /// A caret placement is still waiting on a paint acknowledgement.
    PaintPending,

    #[error("storage error: {0}")]
    /// Loading or saving the document failed.
    Storage(#[from] StoreError),
}

#[derive(Debug, Error)]
/// Errors produced by a [`DocumentStore`](crate::persistence::DocumentStore).
pub enum StoreError {
    #[error("JSON error: {0}")]
    /// The serialized document could not be encoded or decoded.
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("storage backend error: {0}")]
    /// Backend-specific failure.
    Backend(String),
}
