use thiserror::Error;

/// Top-level error type for Pacto.
#[derive(Debug, Error)]
pub enum PactoError {
    /// Error from the AI oracle.
    #[error("oracle error: {0}")]
    Oracle(String),

    /// Error from the messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Goal store error.
    #[error("store error: {0}")]
    Store(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
