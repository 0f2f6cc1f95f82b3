//! Error types for the landmark navigation library.

use thiserror::Error;

use super::LandmarkId;

/// All errors that can occur in the landmark navigation library.
#[derive(Error, Debug)]
pub enum NavError {
    /// Landmark not present in the registry.
    #[error("Landmark {0} not found")]
    LandmarkNotFound(LandmarkId),

    /// A landmark with this id is already registered.
    #[error("Landmark {0} already exists")]
    DuplicateLandmark(LandmarkId),

    /// No landmark carries the requested destination name.
    #[error("No landmark named {0:?}")]
    DestinationNotFound(String),

    /// The destination landmark has no usable position.
    #[error("Destination landmark {0} has lost tracking")]
    DestinationLost(LandmarkId),

    /// A neighbour inference task is still running.
    #[error("Neighbour inference is still running; try again later")]
    InferencePending,

    /// The anchor store has not been attached yet.
    #[error("Anchor store hasn't been loaded")]
    StoreNotLoaded,

    /// Unsupported graph file version.
    #[error("Unsupported graph file version: {0}")]
    UnsupportedVersion(u32),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No tokio runtime to run neighbour inference on.
    #[error("No async runtime available: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NavError {
    /// True for precondition failures that may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InferencePending | Self::StoreNotLoaded)
    }
}

/// Convenience result type for navigation operations.
pub type NavResult<T> = Result<T, NavError>;
