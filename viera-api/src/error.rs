use soap_client::SoapError;
use thiserror::Error;

/// Broad classes of failure, used by callers to decide what to report and
/// whether an operation can continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Wrong arity or malformed numeric argument
    Argument,
    /// Unknown command, service key or vocabulary entry
    Resolution,
    /// Connect, send or receive failure
    Network,
}

/// High-level API errors for Viera control
#[derive(Debug, Error)]
pub enum ApiError {
    /// Fewer positional arguments than the command's template needs
    #[error("Missing {} value(s) for '{command}': expected {expected}, got {supplied}", .expected - .supplied)]
    ArgumentCountMismatch {
        command: String,
        expected: usize,
        supplied: usize,
    },

    /// Malformed argument, such as a port outside 1..=65535
    #[error("Invalid {0}")]
    InvalidArgument(String),

    /// Command name not present in the catalog
    #[error("Invalid command: {0}")]
    UnknownCommand(String),

    /// Service key not present in the catalog
    #[error("Invalid service key: {0}")]
    UnknownService(String),

    /// Remote-control key token not present in the vocabulary
    #[error("Invalid key: {key}. Valid keys: {valid}")]
    UnknownKey { key: String, valid: String },

    /// Local command that has no SOAP action behind it
    #[error("Command '{0}' is not a SOAP action")]
    NotSoapCommand(String),

    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// SOAP fault returned by the device
    #[error("SOAP fault: error code {0}")]
    SoapFault(u16),
}

impl ApiError {
    /// Which of the three failure classes this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::ArgumentCountMismatch { .. } | ApiError::InvalidArgument(_) => {
                ErrorCategory::Argument
            }
            ApiError::UnknownCommand(_)
            | ApiError::UnknownService(_)
            | ApiError::UnknownKey { .. }
            | ApiError::NotSoapCommand(_) => ErrorCategory::Resolution,
            ApiError::NetworkError(_) | ApiError::ParseError(_) | ApiError::SoapFault(_) => {
                ErrorCategory::Network
            }
        }
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            SoapError::Parse(msg) => ApiError::ParseError(msg),
            SoapError::Fault(code) => ApiError::SoapFault(code),
        }
    }
}
