//! Error types for container decoding and playback.
//!
//! Every error here is local to a single trigger: a failed load or playback
//! is reported to the caller and the soundboard stays ready for the next
//! request. Nothing is retried automatically.
//!
//! ## Error Categories
//!
//! - **Decode Errors**: the identifier does not resolve, or the container is
//!   truncated or otherwise malformed
//! - **Playback Errors**: joining the destination failed, or the transport
//!   rejected a frame mid-stream
//! - **Configuration Errors**: the YAML configuration could not be read
//!
//! ```rust
//! use soundboard::{DecodeError, SoundboardError};
//!
//! let error: SoundboardError = DecodeError::malformed(1, 6, "payload truncated").into();
//! assert!(!error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for soundboard operations.
pub type Result<T, E = SoundboardError> = std::result::Result<T, E>;

/// Failure to turn an identifier into a decoded frame sequence.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("Sound '{identifier}' could not be found")]
    ResourceNotFound {
        identifier: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Malformed container at frame {frame_index} (byte offset {offset}): {details}")]
    MalformedContainer { frame_index: usize, offset: u64, details: String },

    #[error("I/O error while reading container: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl DecodeError {
    /// Helper constructor for an identifier that does not resolve.
    pub fn not_found(identifier: impl Into<String>) -> Self {
        DecodeError::ResourceNotFound { identifier: identifier.into(), source: None }
    }

    /// Helper constructor for a length/payload mismatch.
    pub fn malformed(frame_index: usize, offset: u64, details: impl Into<String>) -> Self {
        DecodeError::MalformedContainer { frame_index, offset, details: details.into() }
    }

    /// Helper constructor for read failures with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        DecodeError::Io { context: context.into(), source }
    }
}

/// Errors reported by a transport or connector implementation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    #[error("transport channel closed")]
    Closed,

    #[error("transport rejected the request: {reason}")]
    Rejected { reason: String },

    #[error("transport failure: {reason}")]
    Other {
        reason: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl TransportError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        TransportError::Rejected { reason: reason.into() }
    }
}

/// Failure while streaming a frame sequence to a destination.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PlaybackError {
    /// Joining the destination failed; nothing was sent.
    #[error("Failed to join {destination}")]
    Connect {
        destination: String,
        #[source]
        source: TransportError,
    },

    /// The transport failed after joining. Teardown still ran.
    #[error("Transport failed after {frames_sent} of {total_frames} frames")]
    Transport {
        frames_sent: usize,
        total_frames: usize,
        #[source]
        source: TransportError,
    },
}

/// Top-level error type returned by the soundboard facade and worker.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SoundboardError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("Configuration error in {path}: {details}")]
    Config { path: PathBuf, details: String },

    #[error("Playback worker is not running")]
    WorkerStopped,
}

impl SoundboardError {
    /// Returns whether triggering the same request again could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SoundboardError::Decode(DecodeError::Io { .. }) => true,
            SoundboardError::Decode(_) => false,
            SoundboardError::Playback(_) => true,
            SoundboardError::Config { .. } => false,
            SoundboardError::WorkerStopped => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SoundboardError::Decode(DecodeError::ResourceNotFound { .. }) => vec![
                "Check the sound identifier spelling",
                "Verify the container file exists in the sounds directory",
            ],
            SoundboardError::Decode(DecodeError::MalformedContainer { .. }) => vec![
                "Re-encode the sound into a DCA container",
                "Check the file was not truncated during copy",
            ],
            SoundboardError::Decode(_) => vec![
                "Check file permissions",
                "Verify the storage device is readable",
            ],
            SoundboardError::Playback(PlaybackError::Connect { .. }) => vec![
                "Verify the destination channel still exists",
                "Check the bot has permission to join the channel",
            ],
            SoundboardError::Playback(_) => vec![
                "Trigger the sound again",
                "Check the voice connection is stable",
            ],
            SoundboardError::Config { .. } => vec![
                "Check the configuration file is valid YAML",
                "Compare field names against the documented defaults",
            ],
            SoundboardError::WorkerStopped => vec!["Restart the soundboard"],
        }
    }

    /// Helper constructor for configuration errors.
    pub fn config(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        SoundboardError::Config { path: path.into(), details: details.into() }
    }
}
