//! Subscription lifecycle engine.
//!
//! The TV never confirms a SUBSCRIBE synchronously in a way this client
//! correlates, so the engine learns subscription ids from inbound NOTIFY
//! deliveries and keeps them alive by renewing on a fixed cadence.
//!
//! # Renewal
//!
//! Every active entry is renewed once `renewal_window` has elapsed since it
//! was learned or last renewed. The timestamp is moved forward *before* the
//! renewal is sent, so a slow or failing device produces at most one renewal
//! per window; a failed renewal only shows up as notifications that stop
//! arriving.

use std::time::Duration;

use soap_client::DeviceAddress;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use viera_api::events::{renewal_request, subscribe_request};

use crate::error::Result;
use crate::registry::ServiceRegistry;
use crate::sender::RequestSender;

/// What [`SubscriptionEngine::on_notify_received`] did with a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// A new or changed subscription id was stored
    Updated,
    /// The id matched what was already stored
    Unchanged,
    /// The service key is not in the registry
    UnknownService,
}

/// Owns the service registry and every mutation of subscription state
pub struct SubscriptionEngine<S> {
    registry: ServiceRegistry,
    sender: S,
    device: DeviceAddress,
    renewal_window: Duration,
}

impl<S: RequestSender> SubscriptionEngine<S> {
    pub fn new(sender: S, device: DeviceAddress, renewal_window: Duration) -> Self {
        Self::with_registry(ServiceRegistry::new(), sender, device, renewal_window)
    }

    pub fn with_registry(
        registry: ServiceRegistry,
        sender: S,
        device: DeviceAddress,
        renewal_window: Duration,
    ) -> Self {
        Self {
            registry,
            sender,
            device,
            renewal_window,
        }
    }

    /// Read-only view of subscription state
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn renewal_window(&self) -> Duration {
        self.renewal_window
    }

    /// Ask the TV to NOTIFY `callback_host:callback_port/<key>` for a service.
    ///
    /// Subscription state is not touched; the id arrives later with the first
    /// notification. Returns the TV's raw reply.
    pub async fn subscribe(
        &self,
        service_key: &str,
        callback_host: &str,
        callback_port: u16,
    ) -> Result<Vec<u8>> {
        let entry = self.registry.resolve(service_key)?;
        let request = subscribe_request(entry.info(), &self.device, callback_host, callback_port);
        debug!(service = service_key, %request, "subscribing");

        let reply = self.sender.send(&request).await?;
        info!(service = service_key, callback_host, callback_port, "subscription requested");
        Ok(reply)
    }

    /// Record the subscription id carried by a notification.
    ///
    /// The stored id is replaced whenever it differs from `sid`, including the
    /// first delivery. A repeated id leaves the renewal clock alone.
    pub fn on_notify_received(&mut self, sid: &str, service_key: &str, now: Instant) -> NotifyOutcome {
        let Some(entry) = self.registry.resolve_mut(service_key) else {
            debug!(service = service_key, sid, "notification for unknown service");
            return NotifyOutcome::UnknownService;
        };

        if entry.subscription_id() == Some(sid) {
            return NotifyOutcome::Unchanged;
        }

        entry.set_subscription(sid.to_string(), now);
        info!(service = service_key, sid, "New SID");
        NotifyOutcome::Updated
    }

    /// Renew every subscription whose window has elapsed at `now`.
    ///
    /// Returns how many renewals were sent. Send failures are logged and
    /// left for the next window.
    pub async fn renewal_check(&mut self, now: Instant) -> usize {
        let window = self.renewal_window;
        let mut due = Vec::new();

        for entry in self.registry.entries_mut() {
            let info = entry.info();
            let Some(subscription) = entry.subscription_mut() else {
                continue;
            };
            let elapsed = now.saturating_duration_since(subscription.last_renewal_at);
            if elapsed < window {
                continue;
            }

            subscription.last_renewal_at = now;
            info!(service = info.key, elapsed_secs = elapsed.as_secs(), "renewing subscription");
            due.push((info.key, renewal_request(info, &self.device, &subscription.sid)));
        }

        for (key, request) in &due {
            debug!(service = key, %request, "sending renewal");
            if let Err(e) = self.sender.send(request).await {
                warn!(service = key, error = %e, "renewal failed, retrying next window");
            }
        }

        due.len()
    }

    /// Earliest renewal deadline over active subscriptions, or `None` when
    /// nothing is subscribed and the caller may wait indefinitely.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.registry
            .active()
            .filter_map(|entry| entry.last_renewal_at())
            .map(|at| at + self.renewal_window)
            .min()
    }

    /// Time to wait from `now` until the next deadline, clamped at zero
    pub fn wait_timeout(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soap_client::SoapError;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Mutex;

    const SID_A: &str = "11111111-1111-1111-1111-111111111111";
    const SID_B: &str = "22222222-2222-2222-2222-222222222222";

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl RequestSender for Recorder {
        async fn send(&self, request: &str) -> std::result::Result<Vec<u8>, SoapError> {
            self.sent.lock().unwrap().push(request.to_string());
            if self.fail {
                Err(SoapError::Network("unreachable".to_string()))
            } else {
                Ok(b"HTTP/1.1 200 OK\r\n\r\n".to_vec())
            }
        }
    }

    fn engine(recorder: Recorder) -> SubscriptionEngine<Recorder> {
        let device = DeviceAddress::new("192.168.168.209", 55000, IpAddr::V4(Ipv4Addr::new(192, 168, 168, 209)));
        SubscriptionEngine::new(recorder, device, Duration::from_secs(290))
    }

    fn at(base: Instant, secs: u64) -> Instant {
        base + Duration::from_secs(secs)
    }

    fn sent(engine: &SubscriptionEngine<Recorder>) -> Vec<String> {
        engine.sender.sent.lock().unwrap().clone()
    }

    #[test]
    fn test_first_notification_sets_id_and_time() {
        let mut engine = engine(Recorder::default());
        let t0 = Instant::now();

        assert_eq!(engine.on_notify_received(SID_A, "dmr2", at(t0, 100)), NotifyOutcome::Updated);

        let entry = engine.registry().resolve("dmr2").unwrap();
        assert_eq!(entry.subscription_id(), Some(SID_A));
        assert_eq!(entry.last_renewal_at(), Some(at(t0, 100)));
    }

    #[test]
    fn test_repeated_id_does_not_reset_clock() {
        let mut engine = engine(Recorder::default());
        let t0 = Instant::now();

        engine.on_notify_received(SID_A, "dmr2", at(t0, 100));
        assert_eq!(engine.on_notify_received(SID_A, "dmr2", at(t0, 150)), NotifyOutcome::Unchanged);

        let entry = engine.registry().resolve("dmr2").unwrap();
        assert_eq!(entry.last_renewal_at(), Some(at(t0, 100)));
    }

    #[test]
    fn test_changed_id_replaces_and_resets_clock() {
        let mut engine = engine(Recorder::default());
        let t0 = Instant::now();

        engine.on_notify_received(SID_A, "nrc0", at(t0, 10));
        assert_eq!(engine.on_notify_received(SID_B, "nrc0", at(t0, 20)), NotifyOutcome::Updated);

        let entry = engine.registry().resolve("nrc0").unwrap();
        assert_eq!(entry.subscription_id(), Some(SID_B));
        assert_eq!(entry.last_renewal_at(), Some(at(t0, 20)));
    }

    #[test]
    fn test_unknown_service_is_ignored() {
        let mut engine = engine(Recorder::default());
        assert_eq!(
            engine.on_notify_received(SID_A, "zzz9", Instant::now()),
            NotifyOutcome::UnknownService
        );
        assert_eq!(engine.registry().active().count(), 0);
    }

    #[test]
    fn test_next_deadline_is_unbounded_when_idle() {
        let engine = engine(Recorder::default());
        assert_eq!(engine.next_deadline(), None);
        assert_eq!(engine.wait_timeout(Instant::now()), None);
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let mut engine = engine(Recorder::default());
        let t0 = Instant::now();

        engine.on_notify_received(SID_A, "dmr2", at(t0, 40));
        engine.on_notify_received(SID_B, "nrc0", at(t0, 10));

        assert_eq!(engine.next_deadline(), Some(at(t0, 300)));
        assert_eq!(engine.wait_timeout(at(t0, 100)), Some(Duration::from_secs(200)));
        assert_eq!(engine.wait_timeout(at(t0, 400)), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn test_subscribe_sends_callback_without_touching_state() {
        let engine = engine(Recorder::default());

        engine.subscribe("dmr0", "192.168.168.201", 2222).await.unwrap();

        assert_eq!(
            sent(&engine),
            vec!["SUBSCRIBE /dmr/event_0 HTTP/1.1\r\nHost: 192.168.168.209:55000\r\nCALLBACK: <http://192.168.168.201:2222/dmr0>\r\nNT: upnp:event\r\n\r\n".to_string()]
        );
        assert_eq!(engine.registry().active().count(), 0);
    }

    #[tokio::test]
    async fn test_subscribe_unknown_service_sends_nothing() {
        let engine = engine(Recorder::default());
        assert!(engine.subscribe("abc0", "host", 1).await.is_err());
        assert!(sent(&engine).is_empty());
    }

    #[tokio::test]
    async fn test_renewal_waits_for_full_window() {
        let mut engine = engine(Recorder::default());
        let t0 = Instant::now();
        engine.on_notify_received(SID_A, "dmr2", at(t0, 100));

        assert_eq!(engine.renewal_check(at(t0, 389)).await, 0);
        assert!(sent(&engine).is_empty());

        assert_eq!(engine.renewal_check(at(t0, 390)).await, 1);
        assert_eq!(
            sent(&engine),
            vec![format!("SUBSCRIBE /dmr/event_2 HTTP/1.1\r\nHost: 192.168.168.209:55000\r\nSID: uuid:{SID_A}\r\n\r\n")]
        );
        assert_eq!(engine.registry().resolve("dmr2").unwrap().last_renewal_at(), Some(at(t0, 390)));
        assert_eq!(engine.next_deadline(), Some(at(t0, 680)));
    }

    #[tokio::test]
    async fn test_failed_renewal_still_advances_clock() {
        let mut engine = engine(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let t0 = Instant::now();
        engine.on_notify_received(SID_A, "nrc0", t0);

        assert_eq!(engine.renewal_check(at(t0, 300)).await, 1);
        assert_eq!(engine.renewal_check(at(t0, 301)).await, 0);
        assert_eq!(sent(&engine).len(), 1);
        assert_eq!(engine.registry().resolve("nrc0").unwrap().subscription_id(), Some(SID_A));
    }

    #[tokio::test]
    async fn test_renewal_only_touches_due_entries() {
        let mut engine = engine(Recorder::default());
        let t0 = Instant::now();
        engine.on_notify_received(SID_A, "dmr2", t0);
        engine.on_notify_received(SID_B, "nrc0", at(t0, 200));

        assert_eq!(engine.renewal_check(at(t0, 295)).await, 1);
        assert_eq!(engine.registry().resolve("nrc0").unwrap().last_renewal_at(), Some(at(t0, 200)));
        assert_eq!(engine.next_deadline(), Some(at(t0, 490)));
    }
}
