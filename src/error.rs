// ⚠️ Error taxonomy for the ingestion + projection engine
//
// Only ingestion and configuration can fail. A selection that is not present in a
// dataset is never an error: projectors answer with an empty/None view instead.

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Source text is not valid JSON even after the NaN → null repair
    #[error("Failed to parse {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Source could not be fetched (transport failure, missing file)
    #[error("Source {source_name} unavailable: {reason}")]
    SourceUnavailable {
        source_name: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn parse(source_name: &str, err: impl std::fmt::Display) -> Self {
        EngineError::Parse {
            source_name: source_name.to_string(),
            message: err.to_string(),
        }
    }

    pub fn unavailable(source_name: &str, reason: impl std::fmt::Display) -> Self {
        EngineError::SourceUnavailable {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }
}
