//! Error types for vidswap

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("No source element was supplied")]
    MissingElement,

    #[error("Source element is not attached to a document")]
    DetachedElement,

    #[error("Source element carries no supported media URL")]
    MissingMediaSource,

    #[error("No video id could be extracted from media URL: {url}")]
    NoVideoId { url: String },

    // Lifecycle errors
    #[error("Invalid lifecycle transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Player is not ready (current state: {state})")]
    NotReady { state: String },

    #[error("Adapter has been destroyed")]
    Destroyed,

    // Vendor errors
    #[error("Vendor player construction failed: {0}")]
    Vendor(String),
}

impl Error {
    /// Returns true if this error was raised at construction time and means
    /// the supplied configuration can never produce a working adapter.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::MissingElement
                | Error::DetachedElement
                | Error::MissingMediaSource
                | Error::NoVideoId { .. }
        )
    }

    /// Returns the error code for log correlation
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MissingElement => "MISSING_ELEMENT",
            Error::DetachedElement => "DETACHED_ELEMENT",
            Error::MissingMediaSource => "MISSING_MEDIA_SOURCE",
            Error::NoVideoId { .. } => "NO_VIDEO_ID",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::NotReady { .. } => "NOT_READY",
            Error::Destroyed => "DESTROYED",
            Error::Vendor(_) => "VENDOR",
        }
    }
}
