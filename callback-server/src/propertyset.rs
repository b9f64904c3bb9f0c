//! Decoding of GENA property-set documents for logging

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Result, ServerError};

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Flatten `<e:property>` children into `(name, value)` pairs.
///
/// Namespace prefixes are dropped. Nested markup inside a property value is
/// skipped; escaped markup (as in `LastChange`) is returned unescaped.
pub fn properties(xml: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut out = Vec::new();
    let mut in_property = false;
    let mut depth = 0usize;
    let mut current: Option<String> = None;
    let mut value = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(e.local_name().as_ref());
                if !in_property {
                    if name == "property" {
                        in_property = true;
                        depth = 0;
                    }
                    continue;
                }
                depth += 1;
                if depth == 1 {
                    current = Some(name);
                    value.clear();
                }
            }
            Ok(Event::Empty(e)) => {
                if in_property && depth == 0 {
                    out.push((local_name(e.local_name().as_ref()), String::new()));
                }
            }
            Ok(Event::Text(t)) => {
                if in_property && depth == 1 {
                    let text = t
                        .unescape()
                        .map_err(|e| ServerError::PropertySet(e.to_string()))?;
                    value.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if in_property && depth == 1 {
                    value.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                if !in_property {
                    continue;
                }
                if depth == 0 {
                    if e.local_name().as_ref() == b"property" {
                        in_property = false;
                    }
                    continue;
                }
                if depth == 1 {
                    if let Some(name) = current.take() {
                        out.push((name, std::mem::take(&mut value)));
                    }
                }
                depth -= 1;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ServerError::PropertySet(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(out)
}
