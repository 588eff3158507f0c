//! XML codec for request and response documents.
//!
//! Requests are written by hand from their full-variant field map, so the
//! document always carries exactly the fields that were signed (plus `sign`).
//! Element text escapes `<`, `>` and `&` only; quotes stay literal so JSON
//! payloads pass through untouched. Responses are read with `quick-xml`'s
//! serde support.

use std::collections::BTreeMap;

use quick_xml::escape::partial_escape;
use serde::de::DeserializeOwned;

use crate::canonical::{FieldMap, Variant, WireFields};
use crate::error::DecodeError;

/// Serializes a request as `<xml><name>value</name>...</xml>`.
#[must_use]
pub fn encode(request: &dyn WireFields) -> String {
    let fields = FieldMap::extract(request, Variant::Full);
    let mut out = String::with_capacity(64 + fields.len() * 32);
    out.push_str("<xml>");
    for (name, value) in fields.iter() {
        if name.is_empty() {
            continue;
        }
        push_element(&mut out, name, &partial_escape(value));
    }
    out.push_str("</xml>");
    out
}

/// Renders a field map as an `<xml>` document with CDATA-wrapped values.
#[must_use]
pub fn map_to_xml(fields: &FieldMap) -> String {
    let mut out = String::from("<xml>");
    for (name, value) in fields.iter() {
        if name.is_empty() {
            continue;
        }
        let cdata = format!("<![CDATA[{}]]>", value.replace("]]>", "]]]]><![CDATA[>"));
        push_element(&mut out, name, &cdata);
    }
    out.push_str("</xml>");
    out
}

/// Parses a response body into `T`.
///
/// # Errors
///
/// Returns [`DecodeError`] if the body is not UTF-8, is not well-formed XML,
/// or lacks a field `T` requires.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    let text = std::str::from_utf8(body)?;
    Ok(quick_xml::de::from_str(text)?)
}

/// Parses a flat response body into a field map.
///
/// # Errors
///
/// Returns [`DecodeError`] if the body is not UTF-8 or not a flat
/// well-formed document.
pub fn decode_fields(body: &[u8]) -> Result<FieldMap, DecodeError> {
    let map: BTreeMap<String, String> = decode(body)?;
    Ok(map.into_iter().collect())
}

fn push_element(out: &mut String, name: &str, text: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    out.push_str(text);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}
