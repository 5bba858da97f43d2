//! Helper functions for turning HTTP parts into loggable values
//!
//! Header flattening, display URL construction and lenient body decoding.

use std::collections::BTreeMap;

use actix_web::http::{header::HeaderMap, Uri};
use actix_web::web::Bytes;
use uuid::Uuid;

/// Headers whose values are masked when redaction is enabled
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "proxy-authorization",
    "x-api-key",
    "x-auth-token",
];

pub const REDACTED: &str = "[redacted]";

/// Generate a unique request ID for correlating the events of one request
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Flatten a header map into `name -> value`, joining repeated headers with `,`
///
/// Names come out lowercase (as stored by the `http` crate). Values that are
/// not valid UTF-8 are decoded lossily rather than dropped.
pub fn headers_to_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        map.insert(name.as_str().to_string(), joined);
    }
    map
}

/// Mask the values of credential-carrying headers in place
pub fn redact_headers(headers: &mut BTreeMap<String, String>) {
    for (name, value) in headers.iter_mut() {
        if is_sensitive_header(name) {
            *value = REDACTED.to_string();
        }
    }
}

pub fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|sensitive| sensitive.eq_ignore_ascii_case(name))
}

/// Declared request body length
///
/// Absent, non-numeric or negative values all count as zero, which means
/// "capture nothing".
pub fn declared_content_length(headers: &HeaderMap) -> usize {
    headers
        .get(actix_web::http::header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0)
}

/// Full URL as the client addressed it: scheme, host, path and query
pub fn display_url(scheme: &str, host: &str, uri: &Uri) -> String {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    format!("{scheme}://{host}{path_and_query}")
}

/// Decode body bytes for logging, replacing invalid UTF-8 with U+FFFD
pub fn decode_body(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Body bytes buffered for logging, possibly cut short by the capture limit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedBody {
    pub bytes: Bytes,
    /// Set when more bytes existed than the limit allowed to capture
    pub truncated: bool,
}

impl CapturedBody {
    /// Keep at most `limit` bytes of `bytes`
    pub fn bounded(bytes: &Bytes, limit: Option<usize>) -> Self {
        match limit {
            Some(limit) if bytes.len() > limit => Self {
                bytes: bytes.slice(..limit),
                truncated: true,
            },
            _ => Self {
                bytes: bytes.clone(),
                truncated: false,
            },
        }
    }

    /// Lenient text rendering with a "... (truncated)" suffix when cut
    pub fn text(&self) -> String {
        let text = decode_body(&self.bytes);
        if self.truncated {
            format!("{text}... (truncated)")
        } else {
            text
        }
    }
}
