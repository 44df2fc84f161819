use thiserror::Error;

/// Main error type for the booking race orchestrator
#[derive(Error, Debug)]
pub enum SwarmError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Slot / input errors
    #[error("Invalid slot time: {0}")]
    InvalidSlot(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for SwarmError
pub type Result<T> = std::result::Result<T, SwarmError>;
