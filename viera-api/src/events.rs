//! GENA request framing: SUBSCRIBE, renewal and the heartbeat channel
//!
//! The TV answers SUBSCRIBE with a SID, but the identifier is only ever learned
//! from the first NOTIFY that carries it, so none of these requests expect a
//! parsed reply.

use soap_client::DeviceAddress;

use crate::service::ServiceInfo;

/// Port the TV serves its heartbeat/event stream on
pub const HEARTBEAT_PORT: u16 = 55200;

/// Callback URL the TV should NOTIFY for `service`
pub fn callback_url(callback_host: &str, callback_port: u16, service: &ServiceInfo) -> String {
    format!("http://{}:{}/{}", callback_host, callback_port, service.key)
}

/// Initial subscription request for `service`
pub fn subscribe_request(
    service: &ServiceInfo,
    device: &DeviceAddress,
    callback_host: &str,
    callback_port: u16,
) -> String {
    format!(
        "SUBSCRIBE {path} HTTP/1.1\r\nHost: {host}\r\nCALLBACK: <{callback}>\r\nNT: upnp:event\r\n\r\n",
        path = service.event_path(),
        host = device.host_header(),
        callback = callback_url(callback_host, callback_port, service),
    )
}

/// Renewal of an existing subscription, identified by `sid` (without `uuid:`)
pub fn renewal_request(service: &ServiceInfo, device: &DeviceAddress, sid: &str) -> String {
    format!(
        "SUBSCRIBE {path} HTTP/1.1\r\nHost: {host}\r\nSID: uuid:{sid}\r\n\r\n",
        path = service.event_path(),
        host = device.host_header(),
        sid = sid,
    )
}

/// Long-lived liveness request sent to `heartbeat_port`
pub fn heartbeat_request(device: &DeviceAddress, heartbeat_port: u16) -> String {
    format!(
        "GET /event HTTP/1.1\r\nHost: {}:{}\r\n\r\n",
        device.host(),
        heartbeat_port
    )
}
