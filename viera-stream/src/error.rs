//! Error types for the viera-stream crate.

use callback_server::ServerError;
use soap_client::SoapError;
use viera_api::ApiError;

/// Errors raised while managing subscriptions or running the event loop.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Catalog lookup or request encoding failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The notification listener failed
    #[error("Callback server error: {0}")]
    CallbackServer(#[from] ServerError),

    /// A request could not be delivered
    #[error(transparent)]
    Network(#[from] SoapError),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Convenience type alias for Results using StreamError.
pub type Result<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_error_display() {
        let error = StreamError::from(ApiError::UnknownService("abc0".to_string()));
        assert_eq!(error.to_string(), "Invalid service key: abc0");

        let error = StreamError::Configuration("renewal window must be positive".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: renewal window must be positive"
        );

        let error = StreamError::from(SoapError::Network("refused".to_string()));
        assert_eq!(error.to_string(), "Network error: refused");
    }
}
