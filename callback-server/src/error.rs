//! Error types for the callback server

use thiserror::Error;

/// Errors raised by the NOTIFY listener
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be set up
    #[error("Failed to listen on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Accepting an inbound connection failed
    #[error("Accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// A notification body was not a readable property set
    #[error("Invalid property set: {0}")]
    PropertySet(String),
}

/// Convenience type alias for Results using ServerError
pub type Result<T> = std::result::Result<T, ServerError>;
