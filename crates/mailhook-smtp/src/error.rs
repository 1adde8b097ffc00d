//! Error types for SMTP operations.

use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Recipient's domain has no route and no wildcard is configured.
    ///
    /// Surfaced to the remote client as a 550 rejection of that single
    /// recipient; the session continues.
    #[error("No route for recipient: {0}")]
    UnknownRecipient(String),

    /// Invalid email address in a command argument.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Unrecognized or malformed command line.
    #[error("Syntax error: {0}")]
    Syntax(String),
}
