//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur while talking to the device
#[derive(Debug, Error)]
pub enum SoapError {
    /// Connect, send or receive failure
    #[error("Network error: {0}")]
    Network(String),

    /// Response could not be interpreted
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// SOAP fault returned by the device
    #[error("SOAP fault: error code {0}")]
    Fault(u16),
}

impl From<std::io::Error> for SoapError {
    fn from(error: std::io::Error) -> Self {
        SoapError::Network(error.to_string())
    }
}
