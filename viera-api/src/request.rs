//! SOAP request encoding
//!
//! Substituted arguments are inserted verbatim, without XML escaping. Callers
//! that pass markup-significant characters must sanitize them first.

use soap_client::DeviceAddress;

use crate::command::CommandEntry;
use crate::service::ServiceInfo;
use crate::Result;

/// Client identifier the TV firmware expects
pub const USER_AGENT: &str = "Panasonic VR-CP UPnP/2.0";

/// A framed control request ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapRequest {
    /// Request line and headers, terminated by a blank line
    pub header: String,
    /// SOAP envelope
    pub body: String,
}

impl SoapRequest {
    /// Header followed by body, as sent on the wire
    pub fn to_wire(&self) -> String {
        format!("{}{}", self.header, self.body)
    }
}

/// Substitute positional arguments into `%s` slots, left to right.
///
/// Text inside an argument is never re-scanned for slots.
pub fn fill_template<A: AsRef<str>>(template: &str, args: &[A]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut parts = template.split("%s").peekable();

    while let Some(part) = parts.next() {
        out.push_str(part);
        if parts.peek().is_some() {
            if let Some(arg) = args.next() {
                out.push_str(arg.as_ref());
            }
        }
    }
    out
}

/// Wrap an inner fragment in the standard envelope for `action`
pub fn envelope(action: &str, service: &ServiceInfo, inner: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" "#,
            r#"s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
            r#"<s:Body><u:{action} xmlns:u="{urn}">{inner}</u:{action}></s:Body></s:Envelope>"#,
        ),
        action = action,
        urn = service.urn(),
        inner = inner,
    )
}

/// Build the `POST` header for a control request with a body of `content_length` bytes
pub fn control_header(
    action: &str,
    service: &ServiceInfo,
    device: &DeviceAddress,
    content_length: usize,
) -> String {
    format!(
        "POST {path} HTTP/1.1\r\nUser-Agent: {agent}\r\nHost: {host}\r\nSOAPACTION: \"{urn}#{action}\"\r\nContent-Length: {len}\r\n\r\n",
        path = service.control_path(),
        agent = USER_AGENT,
        host = device.host_header(),
        urn = service.urn(),
        action = action,
        len = content_length,
    )
}

/// Encode a catalog command with its arguments into a framed request
pub fn encode<A: AsRef<str>>(
    command: &CommandEntry,
    args: &[A],
    device: &DeviceAddress,
) -> Result<SoapRequest> {
    let service = command.service()?;
    command.check_arity(args.len())?;

    let inner = fill_template(command.body_template, &args[..command.arg_count]);
    let body = envelope(command.action, service, &inner);
    let header = control_header(command.action, service, device, body.len());

    Ok(SoapRequest { header, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::resolve_command;
    use crate::service::resolve_service;
    use crate::ApiError;
    use std::net::{IpAddr, Ipv4Addr};

    fn device() -> DeviceAddress {
        DeviceAddress::new("192.168.168.209", 55000, IpAddr::V4(Ipv4Addr::new(192, 168, 168, 209)))
    }

    #[test]
    fn test_fill_template_single_slot() {
        assert_eq!(fill_template("<X>%s</X>", &["CH_UP"]), "<X>CH_UP</X>");
    }

    #[test]
    fn test_fill_template_does_not_rescan_arguments() {
        assert_eq!(fill_template("<A>%s</A><B>%s</B>", &["%s", "2"]), "<A>%s</A><B>2</B>");
    }

    #[test]
    fn test_fill_template_without_slots() {
        let none: [&str; 0] = [];
        assert_eq!(fill_template("<InstanceID>0</InstanceID>", &none), "<InstanceID>0</InstanceID>");
    }

    #[test]
    fn test_encode_key_command() {
        let command = resolve_command("key").unwrap();
        let request = encode(command, &["CH_UP"], &device()).unwrap();

        assert!(request
            .body
            .contains("<u:X_SendKey xmlns:u=\"urn:panasonic-com:service:p00NetworkControl:1\"><X_KeyEvent>NRC_CH_UP-ONOFF</X_KeyEvent></u:X_SendKey>"));
        assert!(request.header.starts_with("POST /nrc/control_0 HTTP/1.1\r\n"));
        assert!(request
            .header
            .contains("SOAPACTION: \"urn:panasonic-com:service:p00NetworkControl:1#X_SendKey\"\r\n"));
        assert!(request.header.contains("Host: 192.168.168.209:55000\r\n"));
        assert!(request.header.contains("User-Agent: Panasonic VR-CP UPnP/2.0\r\n"));
        assert!(request.header.ends_with(&format!("Content-Length: {}\r\n\r\n", request.body.len())));
    }

    #[test]
    fn test_encode_exact_header() {
        let command = resolve_command("pl").unwrap();
        let request = encode::<&str>(command, &[], &device()).unwrap();
        let expected = format!(
            "POST /dmr/control_2 HTTP/1.1\r\nUser-Agent: Panasonic VR-CP UPnP/2.0\r\nHost: 192.168.168.209:55000\r\nSOAPACTION: \"urn:schemas-upnp-org:service:AVTransport:1#Play\"\r\nContent-Length: {}\r\n\r\n",
            request.body.len()
        );
        assert_eq!(request.header, expected);
    }

    #[test]
    fn test_encode_missing_argument() {
        let command = resolve_command("setvol").unwrap();
        let result = encode::<&str>(command, &[], &device());
        assert!(matches!(
            result,
            Err(ApiError::ArgumentCountMismatch { expected: 1, supplied: 0, .. })
        ));
    }

    #[test]
    fn test_encode_ignores_extra_arguments() {
        let command = resolve_command("setvol").unwrap();
        let request = encode(command, &["20", "ignored"], &device()).unwrap();
        assert!(request.body.contains("<DesiredVolume>20</DesiredVolume>"));
        assert!(!request.body.contains("ignored"));
    }

    #[test]
    fn test_encode_local_command_is_rejected() {
        let command = resolve_command("event").unwrap();
        assert!(matches!(
            encode(command, &["2222"], &device()),
            Err(ApiError::NotSoapCommand(_))
        ));
    }

    #[test]
    fn test_arguments_are_not_escaped() {
        let service = resolve_service("nrc0").unwrap();
        let body = envelope("X_SendString", service, &fill_template("<X_String>%s</X_String>", &["a&b"]));
        assert!(body.contains("<X_String>a&b</X_String>"));
    }
}
