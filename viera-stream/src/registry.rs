//! Per-service subscription state
//!
//! Identity comes from the static catalog in `viera-api`; the only mutable
//! part is the active subscription, which the subscription engine owns.

use tokio::time::Instant;
use viera_api::{ApiError, ServiceInfo, SERVICES};

/// A subscription the TV has confirmed by delivering an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSubscription {
    /// Provider-assigned id, without the `uuid:` prefix
    pub sid: String,
    /// When the subscription was learned or last renewed
    pub last_renewal_at: Instant,
}

/// One service and its current subscription, if any.
///
/// Keeping id and timestamp in a single `Option` means one can never be set
/// without the other.
#[derive(Debug, Clone)]
pub struct ServiceEntry {
    info: &'static ServiceInfo,
    subscription: Option<ActiveSubscription>,
}

impl ServiceEntry {
    fn new(info: &'static ServiceInfo) -> Self {
        Self {
            info,
            subscription: None,
        }
    }

    pub fn key(&self) -> &'static str {
        self.info.key
    }

    pub fn info(&self) -> &'static ServiceInfo {
        self.info
    }

    pub fn subscription(&self) -> Option<&ActiveSubscription> {
        self.subscription.as_ref()
    }

    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription.as_ref().map(|s| s.sid.as_str())
    }

    pub fn last_renewal_at(&self) -> Option<Instant> {
        self.subscription.as_ref().map(|s| s.last_renewal_at)
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    pub(crate) fn set_subscription(&mut self, sid: String, at: Instant) {
        self.subscription = Some(ActiveSubscription {
            sid,
            last_renewal_at: at,
        });
    }

    pub(crate) fn subscription_mut(&mut self) -> Option<&mut ActiveSubscription> {
        self.subscription.as_mut()
    }
}

/// Every service the TV exposes, with its subscription state
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    entries: Vec<ServiceEntry>,
}

impl ServiceRegistry {
    /// Registry over the full service catalog, with nothing subscribed
    pub fn new() -> Self {
        Self::from_services(SERVICES)
    }

    /// Registry over a custom set of services
    pub fn from_services(services: &'static [ServiceInfo]) -> Self {
        Self {
            entries: services.iter().map(ServiceEntry::new).collect(),
        }
    }

    /// Look up an entry by service key
    pub fn resolve(&self, key: &str) -> Result<&ServiceEntry, ApiError> {
        self.entries
            .iter()
            .find(|entry| entry.key() == key)
            .ok_or_else(|| ApiError::UnknownService(key.to_string()))
    }

    pub(crate) fn resolve_mut(&mut self, key: &str) -> Option<&mut ServiceEntry> {
        self.entries.iter_mut().find(|entry| entry.key() == key)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ServiceEntry> {
        self.entries.iter()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut ServiceEntry> {
        self.entries.iter_mut()
    }

    /// Entries with a live subscription
    pub fn active(&self) -> impl Iterator<Item = &ServiceEntry> {
        self.entries.iter().filter(|entry| entry.is_active())
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
