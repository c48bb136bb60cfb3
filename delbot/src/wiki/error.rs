//! Error type shared by the wiki collaborator traits.

/// Result type for collaborator calls.
pub type FetchResult<T> = Result<T, FetchError>;

/// Error from an external wiki collaborator.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The requested page or revision does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The transport failed (network, HTTP, or API-level error).
    #[error("transport error: {0}")]
    Transport(String),

    /// The collaborator returned data the core cannot interpret.
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<String> for FetchError {
    fn from(s: String) -> Self {
        FetchError::Internal(s)
    }
}

impl From<&str> for FetchError {
    fn from(s: &str) -> Self {
        FetchError::Internal(s.to_string())
    }
}
