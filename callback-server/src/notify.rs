//! Minimal line-oriented parsing of inbound NOTIFY requests
//!
//! The TV only ever sends one request shape, so instead of an HTTP parser this
//! module looks for three literal markers in the raw bytes: the `SID` header,
//! the `NOTIFY /` request line and the closing property-set tag that ends the
//! document. There is no length-based framing; the closing tag is the only
//! end-of-message signal the firmware provides.

/// Header label that precedes the subscription identifier
pub const SID_LABEL: &[u8] = b"SID: uuid:";

/// Request-line prefix that precedes the service key
pub const NOTIFY_PREFIX: &[u8] = b"NOTIFY /";

/// Closing tag of the delivered document
pub const END_MARKER: &[u8] = b"</e:propertyset>";

/// Bytes after the closing tag still accepted as "the tail"
pub const MARKER_SLACK: usize = 16;

/// Length of a subscription identifier
pub const SID_LEN: usize = 36;

/// Length of a service key in the callback path
pub const SERVICE_KEY_LEN: usize = 4;

/// Status line written back once the document is complete
pub const ACK: &[u8] = b"HTTP/1.1 200 OK\r\n";

/// Unparsed event notification received from the TV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    /// Subscription id from the `SID` header, without the `uuid:` prefix
    pub subscription_id: String,
    /// Service key taken from the callback path
    pub service_key: String,
    /// Raw XML body received so far
    pub event_xml: String,
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn field_after(data: &[u8], label: &[u8], len: usize) -> Option<String> {
    let start = find(data, label)? + label.len();
    let value = data.get(start..start + len)?;
    std::str::from_utf8(value).ok().map(str::to_string)
}

/// Extract `(subscription_id, service_key)` once both are fully present
pub fn parse_identifiers(data: &[u8]) -> Option<(String, String)> {
    let sid = field_after(data, SID_LABEL, SID_LEN)?;
    let key = field_after(data, NOTIFY_PREFIX, SERVICE_KEY_LEN)?;
    Some((sid, key))
}

/// Whether the closing tag appears near the end of what has been received
pub fn has_end_marker(data: &[u8]) -> bool {
    let tail_len = END_MARKER.len() + MARKER_SLACK;
    data.len() > tail_len && find(&data[data.len() - tail_len..], END_MARKER).is_some()
}

/// Everything after the header block, lossily decoded
pub fn event_body(data: &[u8]) -> String {
    let body = find(data, b"\r\n\r\n").map_or(&data[data.len()..], |pos| &data[pos + 4..]);
    String::from_utf8_lossy(body).into_owned()
}

/// Build a payload from the bytes received on one connection
pub fn parse_notification(data: &[u8]) -> Option<NotificationPayload> {
    let (subscription_id, service_key) = parse_identifiers(data)?;
    Some(NotificationPayload {
        subscription_id,
        service_key,
        event_xml: event_body(data),
    })
}
