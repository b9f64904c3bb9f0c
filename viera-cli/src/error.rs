//! User-facing failures and their process exit codes

use soap_client::SoapError;
use thiserror::Error;
use viera_api::ApiError;

#[derive(Debug, Error)]
pub enum CliError {
    /// Bad or insufficient command line
    #[error("{0}")]
    Usage(String),

    #[error("Invalid command: {0}")]
    UnknownCommand(String),

    /// Fewer arguments than the command needs
    #[error(transparent)]
    MissingValues(ApiError),

    #[error("Invalid TV address {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: SoapError,
    },

    #[error("Invalid TV port: {0}")]
    DevicePort(#[source] ApiError),

    #[error(transparent)]
    ServiceKey(ApiError),

    #[error("Invalid callback port: {0}")]
    CallbackPort(#[source] ApiError),

    #[error("Invalid listen port: {0}")]
    ListenPort(#[source] ApiError),

    /// Failure after the request was accepted, such as a refused connection
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) | CliError::Fatal(_) => 1,
            CliError::UnknownCommand(_) => 2,
            CliError::MissingValues(_) => 3,
            CliError::Resolve { .. } => 4,
            CliError::DevicePort(_) => 5,
            CliError::ServiceKey(_) => 6,
            CliError::CallbackPort(_) => 7,
            CliError::ListenPort(_) => 8,
        }
    }
}

impl From<ApiError> for CliError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::UnknownCommand(name) => CliError::UnknownCommand(name),
            e @ ApiError::ArgumentCountMismatch { .. } => CliError::MissingValues(e),
            e @ ApiError::UnknownService(_) => CliError::ServiceKey(e),
            e => CliError::Fatal(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn port_error() -> ApiError {
        ApiError::InvalidArgument("IP port: 0".to_string())
    }

    #[rstest]
    #[case(CliError::Usage("usage".into()), 1)]
    #[case(CliError::UnknownCommand("bogus".into()), 2)]
    #[case(CliError::MissingValues(ApiError::ArgumentCountMismatch { command: "set".into(), expected: 1, supplied: 0 }), 3)]
    #[case(CliError::Resolve { host: "nowhere".into(), source: SoapError::Network("no address".into()) }, 4)]
    #[case(CliError::DevicePort(port_error()), 5)]
    #[case(CliError::ServiceKey(ApiError::UnknownService("abc0".into())), 6)]
    #[case(CliError::CallbackPort(port_error()), 7)]
    #[case(CliError::ListenPort(port_error()), 8)]
    #[case(CliError::Fatal(anyhow::anyhow!("connection refused")), 1)]
    fn test_exit_codes(#[case] error: CliError, #[case] code: i32) {
        assert_eq!(error.exit_code(), code);
    }

    #[test]
    fn test_from_api_error() {
        assert_eq!(CliError::from(ApiError::UnknownCommand("x".into())).exit_code(), 2);
        assert_eq!(CliError::from(ApiError::UnknownService("x".into())).exit_code(), 6);
        assert_eq!(CliError::from(ApiError::NotSoapCommand("dial".into())).exit_code(), 1);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            CliError::ListenPort(port_error()).to_string(),
            "Invalid listen port: Invalid IP port: 0"
        );
        assert_eq!(
            CliError::ServiceKey(ApiError::UnknownService("abc0".into())).to_string(),
            "Invalid service key: abc0"
        );
    }
}
