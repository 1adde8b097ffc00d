//! Error types for the gateway pipeline.

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway error types.
///
/// Forwarding errors exist to be logged: nothing downstream of a
/// committed message propagates back into the mail session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The outbound HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The callback endpoint answered outside the 2xx/3xx classes.
    #[error("Callback returned unexpected status {0}")]
    UnexpectedStatus(u16),
}
