//! Log event model and forwarding
//!
//! Defines the two events the interceptor emits per request plus the optional
//! completion summary. Field names are serialized exactly as downstream
//! dashboards and queries expect them (`RequestMethod`, `statusCode`, ...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::sink::LogSink;

/// Emitted before the downstream handler runs
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RequestLogged {
    #[serde(rename = "UserName")]
    pub user_name: Option<String>,

    #[serde(rename = "RequestMethod")]
    pub method: String,

    #[serde(rename = "RequestPath")]
    pub path: String,

    /// Request headers, repeated values joined with `,`
    #[serde(rename = "RequestHeaders")]
    pub headers: BTreeMap<String, String>,

    /// Decoded request body, empty when nothing was declared
    #[serde(rename = "RequestBody")]
    pub body: String,
}

/// Emitted after the downstream handler completed
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResponseLogged {
    #[serde(rename = "UserName")]
    pub user_name: Option<String>,

    #[serde(rename = "RequestMethod")]
    pub method: String,

    #[serde(rename = "RequestPath")]
    pub path: String,

    /// Display URL: scheme, host, path and query
    #[serde(rename = "Host")]
    pub host: String,

    #[serde(rename = "statusCode")]
    pub status_code: u16,

    /// Same text as the matching [`RequestLogged::body`]
    #[serde(rename = "RequestBody")]
    pub request_body: String,

    #[serde(rename = "ResponseBody")]
    pub response_body: String,
}

/// One-line summary written when the request finishes
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RequestCompleted {
    #[serde(rename = "UserName")]
    pub user_name: Option<String>,

    #[serde(rename = "RequestMethod")]
    pub method: String,

    #[serde(rename = "RequestPath")]
    pub path: String,

    /// Status of the response, or the one the host renders for a handler error
    #[serde(rename = "StatusCode")]
    pub status_code: u16,

    #[serde(rename = "Elapsed")]
    pub elapsed_ms: f64,
}

/// Any event the middleware hands to its sink
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "Event")]
pub enum LogEvent {
    Request(RequestLogged),
    Response(ResponseLogged),
    Completed(RequestCompleted),
}

impl LogEvent {
    /// Message template matching the event kind
    pub fn message(&self) -> &'static str {
        match self {
            LogEvent::Request(_) => "Request information",
            LogEvent::Response(_) => "Response information",
            LogEvent::Completed(_) => "HTTP request completed",
        }
    }
}

/// Hand an event to the sink without letting a sink failure escape
///
/// The response must reach the client whether or not logging works, so
/// errors are reported through `tracing` and otherwise dropped.
pub fn forward_log(event: LogEvent, sink: &dyn LogSink) {
    if let Err(e) = sink.emit(&event) {
        tracing::error!(error = %e, event = event.message(), "failed to emit log event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;
    use crate::sink::MemorySink;

    fn request_event() -> LogEvent {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        LogEvent::Request(RequestLogged {
            user_name: Some("alice".to_string()),
            method: "POST".to_string(),
            path: "/api/test".to_string(),
            headers,
            body: r#"{"key":"value"}"#.to_string(),
        })
    }

    #[test]
    fn test_request_event_field_names() {
        let json = serde_json::to_value(request_event()).expect("Failed to serialize");

        assert_eq!(json["Event"], "Request");
        assert_eq!(json["UserName"], "alice");
        assert_eq!(json["RequestMethod"], "POST");
        assert_eq!(json["RequestPath"], "/api/test");
        assert_eq!(json["RequestHeaders"]["content-type"], "application/json");
        assert_eq!(json["RequestBody"], r#"{"key":"value"}"#);
    }

    #[test]
    fn test_response_event_field_names() {
        let event = LogEvent::Response(ResponseLogged {
            user_name: None,
            method: "GET".to_string(),
            path: "/health".to_string(),
            host: "http://localhost:8080/health".to_string(),
            status_code: 200,
            request_body: String::new(),
            response_body: "OK".to_string(),
        });

        let json = serde_json::to_string(&event).expect("Failed to serialize");
        assert!(json.contains("\"statusCode\":200"));
        assert!(json.contains("\"Host\":\"http://localhost:8080/health\""));
        assert!(json.contains("\"ResponseBody\":\"OK\""));
        assert!(json.contains("\"UserName\":null"));
    }

    #[test]
    fn test_log_event_deserialization() {
        let json = r#"{
            "Event": "Completed",
            "UserName": null,
            "RequestMethod": "GET",
            "RequestPath": "/health",
            "StatusCode": 204,
            "Elapsed": 1.5
        }"#;

        let event: LogEvent = serde_json::from_str(json).expect("Failed to deserialize");
        match event {
            LogEvent::Completed(done) => {
                assert_eq!(done.status_code, 204);
                assert_eq!(done.path, "/health");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    struct FailingSink;

    impl LogSink for FailingSink {
        fn emit(&self, _event: &LogEvent) -> Result<(), LogError> {
            Err(LogError::Sink("unavailable".to_string()))
        }
    }

    #[test]
    fn test_forward_log_swallows_sink_failure() {
        // Should not panic
        forward_log(request_event(), &FailingSink);
    }

    #[test]
    fn test_forward_log_records_event() {
        let sink = MemorySink::new();
        forward_log(request_event(), &sink);

        assert_eq!(sink.events(), vec![request_event()]);
    }
}
