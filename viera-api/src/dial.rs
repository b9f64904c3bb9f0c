//! Relay for the DIAL application-launch protocol
//!
//! Verb, path and body are forwarded verbatim under `/nrc/dial/`.

use soap_client::DeviceAddress;

/// Path prefix of the DIAL endpoint on the TV
pub const DIAL_PREFIX: &str = "/nrc/dial/";

/// Frame a DIAL request such as `GET YouTube` or `POST YouTube <payload>`
pub fn dial_request(verb: &str, path: &str, body: Option<&str>, device: &DeviceAddress) -> String {
    let body = body.unwrap_or("");
    format!(
        "{verb} {prefix}{path} HTTP/1.1\r\nContent-Length: {len}\r\nHost: {host}\r\n\r\n{body}",
        verb = verb,
        prefix = DIAL_PREFIX,
        path = path,
        len = body.len(),
        host = device.host_header(),
        body = body,
    )
}
