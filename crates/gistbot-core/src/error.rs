use thiserror::Error;

/// Top-level error type for the gistbot system.
///
/// Subsystem failures (storage, configuration) wrap a message string;
/// domain failures (`Conflict`, `NotFound`) carry the gist id they refer to
/// so callers can match on them without parsing display output.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GistbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Gist already exists: {id}")]
    Conflict { id: String },

    #[error("Gist not found: {id}")]
    NotFound { id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for GistbotError {
    fn from(err: toml::de::Error) -> Self {
        GistbotError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for GistbotError {
    fn from(err: toml::ser::Error) -> Self {
        GistbotError::Config(err.to_string())
    }
}

/// A specialized `Result` type for gistbot operations.
pub type Result<T> = std::result::Result<T, GistbotError>;
