//! Log sinks: where captured events go
//!
//! The middleware never reaches for a global logger. It is given a
//! [`LogSink`] at construction and writes every event through it.

use std::sync::Mutex;

use crate::error::LogError;
use crate::logger::LogEvent;

/// Destination for middleware events
///
/// Implementations must be cheap to call from the request path; they run
/// inline, before and after the downstream handler.
pub trait LogSink: Send + Sync {
    fn emit(&self, event: &LogEvent) -> Result<(), LogError>;
}

/// Default sink: one `tracing` event per log event
///
/// Body events are written at `WARN`, the summary at `INFO`. Every event
/// carries `UserName` when an identity was resolved, and is emitted inside
/// the request span, so subscribers that print span fields also attach
/// `RequestId`.
///
/// `tracing` field values are flat. `RequestHeaders` is therefore recorded as
/// a JSON object encoded in a string; a JSON subscriber writes
/// `"RequestHeaders":"{\"accept\":\"*/*\"}"`. Sinks that serialize
/// [`LogEvent`] directly get a nested map instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, event: &LogEvent) -> Result<(), LogError> {
        match event {
            LogEvent::Request(req) => {
                let headers = serde_json::to_string(&req.headers)?;
                tracing::warn!(
                    UserName = req.user_name.as_deref(),
                    RequestMethod = %req.method,
                    RequestPath = %req.path,
                    RequestHeaders = %headers,
                    RequestBody = %req.body,
                    "Request information {} {} information",
                    req.method,
                    req.path,
                );
            }
            LogEvent::Response(res) => {
                tracing::warn!(
                    UserName = res.user_name.as_deref(),
                    RequestMethod = %res.method,
                    RequestPath = %res.path,
                    Host = %res.host,
                    statusCode = res.status_code,
                    RequestBody = %res.request_body,
                    ResponseBody = %res.response_body,
                    "Response information {} {} {} {}",
                    res.method,
                    res.path,
                    res.host,
                    res.status_code,
                );
            }
            LogEvent::Completed(done) => {
                tracing::info!(
                    UserName = done.user_name.as_deref(),
                    RequestMethod = %done.method,
                    RequestPath = %done.path,
                    StatusCode = done.status_code,
                    Elapsed = done.elapsed_ms,
                    "HTTP {} {} responded {} in {:.4} ms",
                    done.method,
                    done.path,
                    done.status_code,
                    done.elapsed_ms,
                );
            }
        }
        Ok(())
    }
}

/// Sink that keeps every event in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<LogEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) {
        match self.events.lock() {
            Ok(mut events) => events.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl LogSink for MemorySink {
    fn emit(&self, event: &LogEvent) -> Result<(), LogError> {
        self.events
            .lock()
            .map_err(|_| LogError::Sink("memory sink lock poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{RequestCompleted, RequestLogged};
    use crate::test_support::CapturedOutput;
    use std::collections::BTreeMap;

    fn completed(status: u16) -> LogEvent {
        LogEvent::Completed(RequestCompleted {
            user_name: None,
            method: "GET".to_string(),
            path: "/".to_string(),
            status_code: status,
            elapsed_ms: 0.25,
        })
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.emit(&completed(200)).unwrap();
        sink.emit(&completed(404)).unwrap();

        assert_eq!(sink.events(), vec![completed(200), completed(404)]);

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_tracing_sink_accepts_every_event() {
        let sink = TracingSink;
        let request = LogEvent::Request(RequestLogged {
            user_name: None,
            method: "PUT".to_string(),
            path: "/items/1".to_string(),
            headers: BTreeMap::from([("accept".to_string(), "*/*".to_string())]),
            body: "{}".to_string(),
        });

        assert!(sink.emit(&request).is_ok());
        assert!(sink.emit(&completed(500)).is_ok());
    }

    #[test]
    fn test_tracing_sink_fields_in_json_output() {
        let output = CapturedOutput::default();
        let _guard = tracing::subscriber::set_default(output.json_subscriber(tracing::Level::INFO));

        let request = LogEvent::Request(RequestLogged {
            user_name: Some("alice".to_string()),
            method: "POST".to_string(),
            path: "/items".to_string(),
            headers: BTreeMap::from([
                ("accept".to_string(), "*/*".to_string()),
                ("x-tags".to_string(), "a,b".to_string()),
            ]),
            body: "{}".to_string(),
        });
        TracingSink.emit(&request).unwrap();
        TracingSink.emit(&completed(204)).unwrap();

        let lines = output.lines();
        assert_eq!(lines.len(), 2);

        let fields = &lines[0]["fields"];
        assert_eq!(lines[0]["level"], "WARN");
        assert_eq!(fields["UserName"], "alice");
        assert_eq!(fields["RequestMethod"], "POST");
        let headers: BTreeMap<String, String> =
            serde_json::from_str(fields["RequestHeaders"].as_str().unwrap()).unwrap();
        assert_eq!(headers["accept"], "*/*");
        assert_eq!(headers["x-tags"], "a,b");

        assert_eq!(lines[1]["level"], "INFO");
        assert_eq!(lines[1]["fields"]["StatusCode"], 204);
        assert!(lines[1]["fields"].get("UserName").is_none());
    }
}
