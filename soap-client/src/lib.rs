//! Private transport for Panasonic Viera UPnP communication
//!
//! This crate provides the raw TCP request primitive used for every exchange
//! with the TV (SOAP actions, SUBSCRIBE requests, the heartbeat channel and the
//! launch relay) together with a small helper for inspecting SOAP replies.

mod address;
mod error;
mod transport;

pub use address::DeviceAddress;
pub use error::SoapError;
pub use transport::{Connection, Transport, DEFAULT_BUFFER_SIZE};

use xmltree::Element;

/// Split a raw HTTP reply into its status line and body
pub fn split_response(raw: &[u8]) -> (Option<String>, &[u8]) {
    let status = raw
        .split(|&b| b == b'\n')
        .next()
        .map(|line| String::from_utf8_lossy(line).trim_end().to_string())
        .filter(|line| !line.is_empty());

    let body = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map_or(&raw[raw.len()..], |pos| &raw[pos + 4..]);

    (status, body)
}

/// Parse the SOAP body of a raw device reply and return the
/// `<action>Response` element, or the fault code if the device refused.
pub fn extract_response(raw: &[u8], action: &str) -> Result<Element, SoapError> {
    let (_, body) = split_response(raw);
    if body.is_empty() {
        return Err(SoapError::Parse("Empty response body".to_string()));
    }

    let xml = Element::parse(body).map_err(|e| SoapError::Parse(e.to_string()))?;
    extract_from_envelope(&xml, action)
}

fn extract_from_envelope(xml: &Element, action: &str) -> Result<Element, SoapError> {
    let body = xml
        .get_child("Body")
        .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

    if let Some(fault) = body.get_child("Fault") {
        let error_code = fault
            .get_child("detail")
            .and_then(|d| d.get_child("UPnPError"))
            .and_then(|e| e.get_child("errorCode"))
            .and_then(|c| c.get_text())
            .and_then(|t| t.trim().parse::<u16>().ok())
            .unwrap_or(500);
        return Err(SoapError::Fault(error_code));
    }

    let response_name = format!("{}Response", action);
    body.get_child(response_name.as_str())
        .cloned()
        .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
}

/// Child element names and text values of an action response
pub fn response_values(response: &Element) -> Vec<(String, String)> {
    response
        .children
        .iter()
        .filter_map(|node| node.as_element())
        .map(|child| {
            let text = child.get_text().map(|t| t.into_owned()).unwrap_or_default();
            (child.name.clone(), text)
        })
        .collect()
}
