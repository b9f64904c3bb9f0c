//! Device addressing shared by every component that talks to the TV

use std::net::{IpAddr, SocketAddr};

use crate::SoapError;

/// Where the device lives, resolved once at startup.
///
/// `host` is kept exactly as the user typed it because the device expects
/// that spelling in `Host:` headers; `ip` is what sockets connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAddress {
    host: String,
    port: u16,
    ip: IpAddr,
}

impl DeviceAddress {
    /// Build an address from already-resolved parts
    pub fn new(host: impl Into<String>, port: u16, ip: IpAddr) -> Self {
        Self {
            host: host.into(),
            port,
            ip,
        }
    }

    /// Resolve `host` to an IP address, preferring IPv4 results
    pub async fn resolve(host: &str, port: u16) -> Result<Self, SoapError> {
        let candidates: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| SoapError::Network(format!("cannot resolve {host}: {e}")))?
            .collect();

        let chosen = candidates
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| candidates.first())
            .ok_or_else(|| SoapError::Network(format!("no address found for {host}")))?;

        Ok(Self::new(host, port, chosen.ip()))
    }

    /// Host name or literal as given on the command line
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Control port of the device
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolved IP address
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// `host:port` for the control port, as used in `Host:` headers
    pub fn host_header(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Socket address for an arbitrary port on the same device
    pub fn socket_addr(&self, port: u16) -> SocketAddr {
        SocketAddr::new(self.ip, port)
    }
}
