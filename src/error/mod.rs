//! Error handling module for TrackMap

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for TrackMap operations
#[derive(Error, Debug)]
pub enum TrackmapError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON payload could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML settings file could not be parsed
    #[error("Failed to parse settings file: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Settings error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Playback-info request failed
    #[error("Playback info request failed: {message}")]
    PlaybackInfo { message: String },

    /// The server returned no usable media source
    #[error("Unable to find media source for item {item_id}")]
    NoMediaSource { item_id: String },

    /// The server returned no play session id
    #[error("No associated play session ID for item {item_id}")]
    NoPlaySession { item_id: String },

    /// A newer playback attempt started before this one finished
    #[error("Playback attempt {attempt} was superseded")]
    Superseded { attempt: u64 },

    /// The local media engine rejected the media
    #[error("Media engine error: {message}")]
    Engine { message: String },

    /// Domain validation error
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result type alias for TrackMap operations
pub type TrackmapResult<T> = std::result::Result<T, TrackmapError>;
