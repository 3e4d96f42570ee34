use thiserror::Error;

/// Top-level error type for the parley relay.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates map
/// their library errors into these variants so that the `?` operator works
/// seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParleyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Telegram error: {0}")]
    Telegram(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ParleyError {
    fn from(err: toml::de::Error) -> Self {
        ParleyError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ParleyError {
    fn from(err: toml::ser::Error) -> Self {
        ParleyError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ParleyError {
    fn from(err: serde_json::Error) -> Self {
        ParleyError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for parley operations.
pub type Result<T> = std::result::Result<T, ParleyError>;
