//! Long-lived liveness connection to the TV.
//!
//! The TV keeps a `GET /event` request on its heartbeat port open and
//! periodically writes to it. Content is only logged; what matters is that a
//! connection exists, so whenever the TV closes it a fresh one is opened.

use std::time::Duration;

use soap_client::{Connection, Transport};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use viera_api::events::heartbeat_request;

/// Something happened on the heartbeat channel
#[derive(Debug)]
pub enum HeartbeatEvent {
    /// This many bytes arrived and were logged
    Data(usize),
    /// The TV closed the connection
    Closed,
    /// Reading failed; treated like a close
    ReadFailed(std::io::Error),
    /// A previously failed reconnect is due for another attempt
    RetryDue,
}

/// Keeps exactly one heartbeat connection open
pub struct HeartbeatMonitor {
    transport: Transport,
    port: u16,
    request: String,
    stream: Option<TcpStream>,
    retry_delay: Duration,
    retry_at: Option<Instant>,
    buffer: Vec<u8>,
    reconnects: u64,
}

impl HeartbeatMonitor {
    /// Open the heartbeat connection. A failure is logged and retried later
    /// rather than returned.
    pub async fn open(transport: Transport, port: u16, retry_delay: Duration, buffer_size: usize) -> Self {
        let request = heartbeat_request(transport.device(), port);
        debug!(%request, "heartbeat request");

        let mut monitor = Self {
            transport,
            port,
            request,
            stream: None,
            retry_delay,
            retry_at: None,
            buffer: vec![0u8; buffer_size.max(1)],
            reconnects: 0,
        };
        monitor.connect().await;
        monitor
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// How many times the connection has been replaced
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Wait for the next heartbeat event. Cancel-safe.
    pub async fn wait(&mut self) -> HeartbeatEvent {
        match self.stream.as_mut() {
            Some(stream) => match stream.read(&mut self.buffer).await {
                Ok(0) => HeartbeatEvent::Closed,
                Ok(n) => {
                    debug!(chunk = %String::from_utf8_lossy(&self.buffer[..n]), "heartbeat");
                    HeartbeatEvent::Data(n)
                }
                Err(e) => HeartbeatEvent::ReadFailed(e),
            },
            None => {
                let retry_at = *self
                    .retry_at
                    .get_or_insert_with(|| Instant::now() + self.retry_delay);
                sleep_until(retry_at).await;
                HeartbeatEvent::RetryDue
            }
        }
    }

    /// React to an event from [`HeartbeatMonitor::wait`]
    pub async fn handle(&mut self, event: HeartbeatEvent) {
        match event {
            HeartbeatEvent::Data(_) => {}
            HeartbeatEvent::Closed => {
                info!("heartbeat closed by TV, reopening");
                self.reconnect().await;
            }
            HeartbeatEvent::ReadFailed(e) => {
                warn!(error = %e, "heartbeat read failed, reopening");
                self.reconnect().await;
            }
            HeartbeatEvent::RetryDue => self.connect().await,
        }
    }

    async fn reconnect(&mut self) {
        self.stream = None;
        self.reconnects += 1;
        self.connect().await;
    }

    async fn connect(&mut self) {
        match self
            .transport
            .open_and_send(self.port, None, &self.request, true)
            .await
        {
            Ok(Connection::Open(stream)) => {
                self.stream = Some(stream);
                self.retry_at = None;
            }
            Ok(Connection::Drained(_)) => {
                self.schedule_retry();
            }
            Err(e) => {
                warn!(error = %e, retry_in = ?self.retry_delay, "heartbeat connection failed");
                self.schedule_retry();
            }
        }
    }

    fn schedule_retry(&mut self) {
        self.stream = None;
        self.retry_at = Some(Instant::now() + self.retry_delay);
    }
}
