//! Panasonic Viera UPnP control API
//!
//! This crate holds the static knowledge needed to talk to the TV: the
//! service catalog and its addressing convention, the command catalog, the
//! remote-control key vocabulary, and builders for every request the device
//! accepts. It uses the private `soap-client` crate for addressing and
//! transport.
//!
//! ```rust,ignore
//! use viera_api::{encode, resolve_command, DeviceAddress};
//!
//! let device = DeviceAddress::resolve("192.168.1.20", 55000).await?;
//! let request = encode(resolve_command("key")?, &["CH_UP"], &device)?;
//! ```

pub mod command;
pub mod dial;
pub mod error;
pub mod events;
pub mod keys;
pub mod request;
pub mod service;

pub use command::{command_names, resolve_command, CommandEntry, CommandTarget, COMMANDS};
pub use error::{ApiError, ErrorCategory, Result};
pub use request::{encode, SoapRequest};
pub use service::{resolve_service, ServiceInfo, SERVICES};
pub use soap_client::DeviceAddress;

/// Parse a TCP port: base-10, no trailing characters, within 1..=65535
pub fn parse_port(value: &str) -> Result<u16> {
    value
        .parse::<u16>()
        .ok()
        .filter(|&port| port != 0)
        .ok_or_else(|| ApiError::InvalidArgument(format!("IP port: {value}")))
}
