//! Configuration for event mode
//!
//! Controls the notification listener, renewal cadence and the heartbeat
//! channel.

use std::time::Duration;

use callback_server::DEFAULT_MAX_NOTIFICATION_SIZE;
use viera_api::events::HEARTBEAT_PORT;

use crate::error::{Result, StreamError};

/// Configuration for the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Port the notification listener binds to
    /// Default: 55100
    pub listen_port: u16,

    /// Time after the last renewal at which a subscription is renewed again.
    /// Kept safely under the TV's 300 second subscription timeout.
    /// Default: 290 seconds
    pub renewal_window: Duration,

    /// Port of the heartbeat/event stream on the TV
    /// Default: 55200
    pub heartbeat_port: u16,

    /// Delay before retrying a heartbeat connection that could not be opened
    /// Default: 5 seconds
    pub heartbeat_retry_delay: Duration,

    /// Receive buffer size for every read
    /// Default: 16 KiB
    pub read_buffer_size: usize,

    /// Listen backlog for the notification socket
    /// Default: 4
    pub listen_backlog: u32,

    /// Bytes one callback connection may deliver before it is dropped
    /// Default: 64 KiB
    pub max_notification_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            listen_port: 55100,
            renewal_window: Duration::from_secs(290),
            heartbeat_port: HEARTBEAT_PORT,
            heartbeat_retry_delay: Duration::from_secs(5),
            read_buffer_size: 16 * 1024,
            listen_backlog: 4,
            max_notification_size: DEFAULT_MAX_NOTIFICATION_SIZE,
        }
    }
}

impl StreamConfig {
    /// Create a new StreamConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listener port
    pub fn with_listen_port(mut self, port: u16) -> Self {
        self.listen_port = port;
        self
    }

    /// Set the renewal window
    pub fn with_renewal_window(mut self, window: Duration) -> Self {
        self.renewal_window = window;
        self
    }

    /// Set the heartbeat port
    pub fn with_heartbeat_port(mut self, port: u16) -> Self {
        self.heartbeat_port = port;
        self
    }

    /// Set the heartbeat retry delay
    pub fn with_heartbeat_retry_delay(mut self, delay: Duration) -> Self {
        self.heartbeat_retry_delay = delay;
        self
    }

    /// Set the receive buffer size
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the per-connection notification size cap
    pub fn with_max_notification_size(mut self, size: usize) -> Self {
        self.max_notification_size = size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.renewal_window.is_zero() {
            return Err(StreamError::Configuration(
                "renewal window must be positive".to_string(),
            ));
        }

        if self.heartbeat_port == 0 {
            return Err(StreamError::Configuration(
                "heartbeat port must not be 0".to_string(),
            ));
        }

        if self.heartbeat_retry_delay.is_zero() {
            return Err(StreamError::Configuration(
                "heartbeat retry delay must be positive".to_string(),
            ));
        }

        if self.read_buffer_size == 0 {
            return Err(StreamError::Configuration(
                "read buffer size must be positive".to_string(),
            ));
        }

        if self.max_notification_size < self.read_buffer_size {
            return Err(StreamError::Configuration(
                "max notification size must be at least the read buffer size".to_string(),
            ));
        }

        if self.listen_backlog == 0 {
            return Err(StreamError::Configuration(
                "listen backlog must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.renewal_window, Duration::from_secs(290));
        assert_eq!(config.heartbeat_port, 55200);
        assert_eq!(config.listen_backlog, 4);
        assert_eq!(config.max_notification_size, 64 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = StreamConfig::new()
            .with_listen_port(2222)
            .with_renewal_window(Duration::from_secs(60))
            .with_heartbeat_port(55201)
            .with_heartbeat_retry_delay(Duration::from_secs(1))
            .with_read_buffer_size(4096);

        assert_eq!(config.listen_port, 2222);
        assert_eq!(config.renewal_window, Duration::from_secs(60));
        assert_eq!(config.heartbeat_port, 55201);
        assert_eq!(config.heartbeat_retry_delay, Duration::from_secs(1));
        assert_eq!(config.read_buffer_size, 4096);
    }

    #[rstest]
    #[case::zero_window(StreamConfig::new().with_renewal_window(Duration::ZERO))]
    #[case::zero_heartbeat_port(StreamConfig::new().with_heartbeat_port(0))]
    #[case::zero_buffer(StreamConfig::new().with_read_buffer_size(0))]
    #[case::cap_below_buffer(StreamConfig::new().with_max_notification_size(1024))]
    #[case::zero_retry_delay(StreamConfig::new().with_heartbeat_retry_delay(Duration::ZERO))]
    fn test_validation_rejects(#[case] config: StreamConfig) {
        assert!(matches!(config.validate(), Err(StreamError::Configuration(_))));
    }
}
