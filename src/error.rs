//! Custom error types for stable-collector
//!
//! Parse failures are deliberately not represented here: a file whose
//! metadata is missing or malformed becomes an error entry in the index
//! (see [`crate::parse::ParseOutcome`]), not an `Err` that stops a run.

use thiserror::Error;

/// Main error type for stable-collector operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("PNG error: {0}")]
    Png(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<png::DecodingError> for Error {
    fn from(err: png::DecodingError) -> Self {
        Error::Png(err.to_string())
    }
}

/// Result type alias for stable-collector
pub type Result<T> = std::result::Result<T, Error>;
