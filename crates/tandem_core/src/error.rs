//! # Queue Error Types
//!
//! All errors that can surface from the command queue.
//!
//! Most misuse is prevented by construction (a flushed recorder no longer
//! exists, a second commit blocks until the consumer has drained the first),
//! so this list is short on purpose.

use thiserror::Error;

/// Errors that can occur while recording, handing off, or configuring a queue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Uniform payload does not fit in the inline uniform block.
    #[error("uniform block too large: {len} bytes, capacity {capacity}")]
    UniformBlockTooLarge {
        /// Length of the rejected payload.
        len: usize,
        /// Inline capacity of a uniform record.
        capacity: usize,
    },

    /// The other side of the queue has been dropped.
    #[error("the other end of the command queue has been dropped")]
    Disconnected,

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read or parsed.
    #[error("failed to read configuration from {path}: {reason}")]
    ConfigRead {
        /// Path that was being loaded.
        path: String,
        /// Underlying IO or parse failure.
        reason: String,
    },
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;
