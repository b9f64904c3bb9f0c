//! TCP listener for UPnP NOTIFY callbacks.

use std::net::{Ipv4Addr, SocketAddr};

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, info, warn};

use crate::error::{Result, ServerError};
use crate::notify::{has_end_marker, parse_notification, NotificationPayload, ACK};
use crate::propertyset;

/// Default receive buffer size per read
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Default listen backlog
pub const DEFAULT_BACKLOG: u32 = 4;

/// Default cap on the bytes kept from one connection
pub const DEFAULT_MAX_NOTIFICATION_SIZE: usize = 64 * 1024;

/// Listening socket that receives event notifications from the TV.
///
/// Connections are handled one at a time: [`EventServer::handle_connection`]
/// drains a connection to completion before the caller goes back to waiting,
/// so a slow sender holds up everything else sharing the caller's loop.
#[derive(Debug)]
pub struct EventServer {
    listener: TcpListener,
    buffer_size: usize,
    max_notification_size: usize,
}

impl EventServer {
    /// Bind on all interfaces with address reuse enabled
    pub async fn bind(port: u16, backlog: u32) -> Result<Self> {
        let bind_error = |source: std::io::Error| ServerError::Bind { port, source };

        let socket = TcpSocket::new_v4().map_err(bind_error)?;
        socket.set_reuseaddr(true).map_err(bind_error)?;
        socket
            .bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
            .map_err(bind_error)?;
        let listener = socket.listen(backlog).map_err(bind_error)?;

        info!(port = listener.local_addr().map_or(port, |a| a.port()), "Listening for notifications");
        Ok(Self {
            listener,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_notification_size: DEFAULT_MAX_NOTIFICATION_SIZE,
        })
    }

    /// Override the receive buffer size
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Override how many bytes one connection may deliver before it is
    /// dropped without an acknowledgement
    pub fn with_max_notification_size(mut self, max: usize) -> Self {
        self.max_notification_size = max.max(1);
        self
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(ServerError::Accept)
    }

    /// Wait for the next inbound connection
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        self.listener.accept().await.map_err(ServerError::Accept)
    }

    /// Drain one connection, acknowledging once the closing tag arrives.
    ///
    /// Returns the parsed notification if both the subscription id and the
    /// service key were seen, even when the sender went away before the
    /// document was complete. A sender that exceeds the size cap without
    /// finishing the document is cut off and gets no acknowledgement.
    pub async fn handle_connection(
        &self,
        mut stream: TcpStream,
        peer: SocketAddr,
    ) -> Option<NotificationPayload> {
        let mut received = BytesMut::with_capacity(self.buffer_size);

        loop {
            received.reserve(self.buffer_size);
            let mut chunk = (&mut received).limit(self.buffer_size);
            match stream.read_buf(&mut chunk).await {
                Ok(0) => {
                    debug!(%peer, "sender closed before end of document");
                    break;
                }
                Ok(n) => {
                    debug!(%peer, bytes = n, chunk = %String::from_utf8_lossy(&received[received.len() - n..]), "received");
                }
                Err(e) => {
                    warn!(%peer, error = %e, "read failed");
                    break;
                }
            }

            if has_end_marker(&received) {
                if let Err(e) = stream.write_all(ACK).await {
                    warn!(%peer, error = %e, "failed to acknowledge notification");
                }
                break;
            }

            if received.len() > self.max_notification_size {
                warn!(%peer, bytes = received.len(), limit = self.max_notification_size, "notification too large, dropping connection");
                break;
            }
        }

        let payload = parse_notification(&received);
        if let Some(ref payload) = payload {
            log_properties(payload);
        }
        payload
    }
}

fn log_properties(payload: &NotificationPayload) {
    match propertyset::properties(&payload.event_xml) {
        Ok(props) => {
            for (name, value) in props {
                info!(service = %payload.service_key, property = %name, %value, "property changed");
            }
        }
        Err(e) => debug!(service = %payload.service_key, error = %e, "notification body not decoded"),
    }
}
