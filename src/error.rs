//! Error types for the pose streamer library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Connection could not be established or a frame could not be written
    #[error("Transport error: {0}")]
    Transport(String),

    /// The sample channel was closed while waiting for data
    #[error("Sample channel closed")]
    ChannelClosed,

    /// Message serialization or parsing failed
    #[error("Codec error: {0}")]
    Codec(String),

    /// Session lifecycle misuse or worker failure
    #[error("Session error: {0}")]
    Session(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

impl Error {
    /// Whether this error is the normal shutdown signal rather than a failure
    #[must_use]
    pub const fn is_channel_closed(&self) -> bool {
        matches!(self, Self::ChannelClosed)
    }
}

impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Self::Transport(msg) => Self::Transport(msg.clone()),
            Self::ChannelClosed => Self::ChannelClosed,
            Self::Codec(msg) => Self::Codec(msg.clone()),
            Self::Session(msg) => Self::Session(msg.clone()),
            // io::Error is not Clone; keep the kind and message
            Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), e.to_string())),
            Self::InvalidInput(msg) => Self::InvalidInput(msg.clone()),
            Self::ConfigError(msg) => Self::ConfigError(msg.clone()),
            Self::IoError(msg) => Self::IoError(msg.clone()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Codec(e.to_string())
    }
}

/// Application-specific error type (alias for main Error type)
pub type AppError = Error;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
