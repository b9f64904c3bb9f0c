//! Blocking-style request primitive over plain TCP
//!
//! Every request the device understands is hand-framed text, so the transport
//! only connects, writes the bytes it is given and optionally drains the
//! reply. There is no retry here; callers own retry policy.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::{DeviceAddress, SoapError};

/// Default receive buffer size
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Result of [`Transport::open_and_send`]
#[derive(Debug)]
pub enum Connection {
    /// The peer closed the connection; everything it sent is here
    Drained(Vec<u8>),
    /// The connection was left open for the caller to manage
    Open(TcpStream),
}

impl Connection {
    /// Drained bytes, or empty for an open connection
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Connection::Drained(bytes) => bytes,
            Connection::Open(_) => Vec::new(),
        }
    }
}

/// Sends framed requests to one device
#[derive(Debug, Clone)]
pub struct Transport {
    device: DeviceAddress,
    buffer_size: usize,
}

impl Transport {
    /// Create a transport for the given device
    pub fn new(device: DeviceAddress) -> Self {
        Self {
            device,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Override the receive buffer size
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// The device this transport talks to
    pub fn device(&self) -> &DeviceAddress {
        &self.device
    }

    /// Connect to `port` on the device, send `header` (if any) followed by
    /// `body`, then either drain until the peer closes or hand back the open
    /// stream.
    pub async fn open_and_send(
        &self,
        port: u16,
        header: Option<&str>,
        body: &str,
        keep_open: bool,
    ) -> Result<Connection, SoapError> {
        let addr = self.device.socket_addr(port);
        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|e| SoapError::Network(format!("connect to {addr} failed: {e}")))?;

        if let Some(header) = header {
            stream.write_all(header.as_bytes()).await?;
        }
        stream.write_all(body.as_bytes()).await?;
        debug!(%addr, bytes = header.map_or(0, str::len) + body.len(), "request sent");

        if keep_open {
            return Ok(Connection::Open(stream));
        }

        let received = self.drain(&mut stream).await?;
        Ok(Connection::Drained(received))
    }

    /// Send a request and collect the whole reply
    pub async fn send_and_drain(
        &self,
        port: u16,
        header: Option<&str>,
        body: &str,
    ) -> Result<Vec<u8>, SoapError> {
        self.open_and_send(port, header, body, false)
            .await
            .map(Connection::into_bytes)
    }

    async fn drain(&self, stream: &mut TcpStream) -> Result<Vec<u8>, SoapError> {
        let mut received = Vec::new();
        let mut buf = vec![0u8; self.buffer_size];
        loop {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            trace!(chunk = %String::from_utf8_lossy(&buf[..n]), "received");
            received.extend_from_slice(&buf[..n]);
        }
        Ok(received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::net::TcpListener;

    async fn local_device() -> (TcpListener, Transport) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let device = DeviceAddress::new("127.0.0.1", port, IpAddr::V4(Ipv4Addr::LOCALHOST));
        (listener, Transport::new(device))
    }

    #[tokio::test]
    async fn test_send_and_drain_collects_until_close() {
        let (listener, transport) = local_device().await;
        let port = transport.device().port();

        let peer = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 1024];
            let mut seen = Vec::new();
            while !seen.ends_with(b"BODY") {
                let n = socket.read(&mut buf).await.unwrap();
                seen.extend_from_slice(&buf[..n]);
            }
            socket.write_all(b"HTTP/1.1 200 OK\r\n\r\n").await.unwrap();
            socket.write_all(b"done").await.unwrap();
            seen
        });

        let reply = transport
            .send_and_drain(port, Some("HEAD\r\n"), "BODY")
            .await
            .unwrap();

        assert_eq!(reply, b"HTTP/1.1 200 OK\r\n\r\ndone");
        assert_eq!(peer.await.unwrap(), b"HEAD\r\nBODY");
    }

    #[tokio::test]
    async fn test_keep_open_returns_stream() {
        let (listener, transport) = local_device().await;
        let port = transport.device().port();

        let peer = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"tick").await.unwrap();
        });

        let connection = transport
            .open_and_send(port, None, "GET /event HTTP/1.1\r\n\r\n", true)
            .await
            .unwrap();

        let Connection::Open(mut stream) = connection else {
            panic!("expected an open connection");
        };
        let mut buf = [0u8; 4];
        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"tick");
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_failure_is_network_error() {
        let (listener, transport) = local_device().await;
        let port = transport.device().port();
        drop(listener);

        let result = transport.send_and_drain(port, None, "x").await;
        assert!(matches!(result, Err(SoapError::Network(_))));
    }
}
