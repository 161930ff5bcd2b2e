use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure reported by a collaborator (data source, connection manager, host window).
    #[error("{0}")]
    Remote(String),

    /// A node-level fetch failure, already prefixed for display.
    #[error("{0}")]
    Fetch(String),

    #[error("Not connected: {0}")]
    NotConnected(String),

    #[error("{0}")]
    Prompt(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Operation aborted")]
    Aborted,
}

impl Error {
    /// Wrap any displayable failure with a human-readable prefix.
    pub fn fetch(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Fetch(format!("{context}: {err}"))
    }
}

/// Convenience Result type using our Error
pub type Result<T> = std::result::Result<T, Error>;
