//! Error types for the mirror engine.

use gistmirror_remote::RemoteError;
use gistmirror_store::{NodeId, StoreError};
use thiserror::Error;

/// Result type for mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Errors that can occur during a mirror pass.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Store error while reading or writing nodes.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// No username could be resolved for the mirror root.
    #[error("no username configured for mirror root {root}")]
    UsernameUnresolved {
        /// The mirror root that lacks a username.
        root: NodeId,
    },

    /// Listing the remote collection failed; the pass was aborted.
    #[error("listing items for {username} failed: {source}")]
    Listing {
        /// Username whose collection was listed.
        username: String,
        /// Underlying remote error.
        #[source]
        source: RemoteError,
    },

    /// Another pass is still running on this engine.
    #[error("a mirror pass is already running")]
    AlreadyRunning,

    /// An item task panicked or was cancelled.
    #[error("item task failed: {0}")]
    Task(String),
}

impl MirrorError {
    /// Returns true for configuration problems that retrying cannot fix.
    pub fn is_config_error(&self) -> bool {
        matches!(self, MirrorError::UsernameUnresolved { .. })
    }

    /// Returns true if the next scheduled pass may succeed unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            MirrorError::Listing { source, .. } => source.is_retryable(),
            MirrorError::AlreadyRunning => true,
            _ => false,
        }
    }
}
