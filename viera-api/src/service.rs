use crate::{ApiError, Result};

/// Identity of one controllable UPnP service on the TV.
///
/// The key doubles as an address: its first three characters name the
/// firmware directory (`dmr`, `nrc`, ...) and the fourth selects the numbered
/// control/event endpoint inside it. The firmware layout is fixed, so this
/// mapping has to be reproduced character for character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceInfo {
    /// Short code, unique within the catalog (e.g. `dmr2`)
    pub key: &'static str,
    /// URN suffix used in envelopes and `SOAPACTION` headers
    pub schema: &'static str,
}

/// Every service the TV exposes
pub const SERVICES: &[ServiceInfo] = &[
    ServiceInfo { key: "pac0", schema: "panasonic-com:service:p00ProAVControlService:1" },
    ServiceInfo { key: "nrc0", schema: "panasonic-com:service:p00NetworkControl:1" },
    ServiceInfo { key: "dms0", schema: "schemas-upnp-org:service:ContentDirectory:1" },
    ServiceInfo { key: "dms1", schema: "schemas-upnp-org:service:ConnectionManager:1" },
    ServiceInfo { key: "dmr0", schema: "schemas-upnp-org:service:RenderingControl:1" },
    ServiceInfo { key: "dmr1", schema: "schemas-upnp-org:service:ConnectionManager:1" },
    ServiceInfo { key: "dmr2", schema: "schemas-upnp-org:service:AVTransport:1" },
];

/// Look up a service by key
pub fn resolve_service(key: &str) -> Result<&'static ServiceInfo> {
    SERVICES
        .iter()
        .find(|service| service.key == key)
        .ok_or_else(|| ApiError::UnknownService(key.to_string()))
}

impl ServiceInfo {
    /// Firmware directory, the first three characters of the key
    pub fn path_segment(&self) -> &'static str {
        &self.key[..3]
    }

    /// Endpoint number, the fourth character of the key
    pub fn path_suffix(&self) -> char {
        char::from(self.key.as_bytes()[3])
    }

    /// Path that receives SOAP actions, e.g. `/dmr/control_2`
    pub fn control_path(&self) -> String {
        format!("/{}/control_{}", self.path_segment(), self.path_suffix())
    }

    /// Path that receives SUBSCRIBE requests, e.g. `/dmr/event_2`
    pub fn event_path(&self) -> String {
        format!("/{}/event_{}", self.path_segment(), self.path_suffix())
    }

    /// Full service type URN
    pub fn urn(&self) -> String {
        format!("urn:{}", self.schema)
    }
}
