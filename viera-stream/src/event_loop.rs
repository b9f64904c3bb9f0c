//! Single-threaded reactor for event mode.
//!
//! Each turn waits on whichever comes first: an inbound notification
//! connection, heartbeat activity, or the earliest renewal deadline. With no
//! active subscription the deadline arm is disabled and the loop waits
//! indefinitely on the other two.

use std::io::ErrorKind;
use std::time::Duration;

use callback_server::{EventServer, ServerError};
use soap_client::Transport;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, warn};

use crate::config::StreamConfig;
use crate::error::Result;
use crate::heartbeat::HeartbeatMonitor;
use crate::sender::RequestSender;
use crate::subscription::SubscriptionEngine;

/// Pause after an accept failure that is not specific to one connection
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// What woke the loop on a given turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// A callback connection was accepted and drained
    Notification,
    /// The heartbeat channel produced an event
    Heartbeat,
    /// The renewal deadline passed; this many renewals were sent
    Renewal(usize),
    /// Accepting a callback connection failed; the loop carries on
    AcceptFailed,
}

/// Listener, heartbeat and subscription engine driven by one loop
pub struct EventLoop<S> {
    server: EventServer,
    heartbeat: HeartbeatMonitor,
    engine: SubscriptionEngine<S>,
}

impl EventLoop<Transport> {
    /// Bind the listener and open the heartbeat as described by `config`
    pub async fn start(config: &StreamConfig, transport: Transport) -> Result<Self> {
        config.validate()?;

        let server = EventServer::bind(config.listen_port, config.listen_backlog)
            .await?
            .with_buffer_size(config.read_buffer_size)
            .with_max_notification_size(config.max_notification_size);

        let transport = transport.with_buffer_size(config.read_buffer_size);
        let heartbeat = HeartbeatMonitor::open(
            transport.clone(),
            config.heartbeat_port,
            config.heartbeat_retry_delay,
            config.read_buffer_size,
        )
        .await;

        let device = transport.device().clone();
        let engine = SubscriptionEngine::new(transport, device, config.renewal_window);

        Ok(Self::new(server, heartbeat, engine))
    }
}

impl<S: RequestSender> EventLoop<S> {
    pub fn new(server: EventServer, heartbeat: HeartbeatMonitor, engine: SubscriptionEngine<S>) -> Self {
        Self {
            server,
            heartbeat,
            engine,
        }
    }

    pub fn engine(&self) -> &SubscriptionEngine<S> {
        &self.engine
    }

    pub fn server(&self) -> &EventServer {
        &self.server
    }

    pub fn heartbeat(&self) -> &HeartbeatMonitor {
        &self.heartbeat
    }

    /// Run forever. Accept failures are logged and survived; only an error
    /// that leaves no usable listener ends the loop.
    pub async fn run(mut self) -> Result<()> {
        loop {
            self.turn().await?;
        }
    }

    /// Wait for and handle exactly one wakeup
    pub async fn turn(&mut self) -> Result<Wakeup> {
        let now = Instant::now();
        let deadline = self.engine.next_deadline();
        match self.engine.wait_timeout(now) {
            Some(wait) => debug!(wait_ms = wait.as_millis() as u64, "Waiting"),
            None => debug!("Waiting indefinitely"),
        }

        tokio::select! {
            accepted = self.server.accept() => match accepted {
                Ok((stream, peer)) => {
                    if let Some(notification) = self.server.handle_connection(stream, peer).await {
                        self.engine.on_notify_received(
                            &notification.subscription_id,
                            &notification.service_key,
                            Instant::now(),
                        );
                    }
                    Ok(Wakeup::Notification)
                }
                Err(ServerError::Accept(e)) => {
                    warn!(error = %e, "accept failed");
                    if let Some(pause) = accept_backoff(e.kind()) {
                        sleep(pause).await;
                    }
                    Ok(Wakeup::AcceptFailed)
                }
                Err(e) => Err(e.into()),
            },
            event = self.heartbeat.wait() => {
                self.heartbeat.handle(event).await;
                Ok(Wakeup::Heartbeat)
            }
            _ = sleep_until(deadline.unwrap_or(now)), if deadline.is_some() => {
                let renewed = self.engine.renewal_check(Instant::now()).await;
                Ok(Wakeup::Renewal(renewed))
            }
        }
    }
}

/// How long to pause after a failed accept. Per-connection failures retry
/// at once; anything else, such as running out of descriptors, would fail
/// again immediately and spin the loop.
fn accept_backoff(kind: ErrorKind) -> Option<Duration> {
    match kind {
        ErrorKind::ConnectionAborted
        | ErrorKind::ConnectionReset
        | ErrorKind::Interrupted
        | ErrorKind::WouldBlock => None,
        _ => Some(ACCEPT_BACKOFF),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io;

    #[rstest]
    #[case(ErrorKind::ConnectionAborted, None)]
    #[case(ErrorKind::ConnectionReset, None)]
    #[case(ErrorKind::Interrupted, None)]
    #[case(ErrorKind::OutOfMemory, Some(ACCEPT_BACKOFF))]
    #[case(ErrorKind::PermissionDenied, Some(ACCEPT_BACKOFF))]
    fn test_accept_backoff(#[case] kind: ErrorKind, #[case] expected: Option<Duration>) {
        assert_eq!(accept_backoff(kind), expected);
    }

    #[test]
    fn test_descriptor_exhaustion_backs_off() {
        // EMFILE and ENFILE on Linux
        for code in [24, 23] {
            let error = io::Error::from_raw_os_error(code);
            assert_eq!(accept_backoff(error.kind()), Some(ACCEPT_BACKOFF));
        }
    }
}
