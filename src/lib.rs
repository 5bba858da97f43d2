//! # bodylog_actix
//!
//! Request/response body logging middleware for Actix-Web applications.
//!
//! For every request the middleware writes two structured events: one before
//! the handler runs (method, path, headers, request body) and one after it
//! returns (display URL, status, request and response bodies). Both bodies are
//! buffered on the side; the handler and the client see exactly the bytes
//! they would have seen without the middleware.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use actix_web::{web, App, HttpResponse, HttpServer};
//! use bodylog_actix::{telemetry, RequestLogger};
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     telemetry::init_subscriber("info", telemetry::LogFormat::Json).ok();
//!
//!     HttpServer::new(|| {
//!         App::new()
//!             .wrap(RequestLogger::new())
//!             .service(web::resource("/").to(|| async {
//!                 HttpResponse::Ok().body("Hello!")
//!             }))
//!     })
//!     .bind("0.0.0.0:8080")?
//!     .run()
//!     .await
//! }
//! ```
//!
//! ## Event fields
//!
//! | Event                  | Fields                                                                 |
//! |------------------------|------------------------------------------------------------------------|
//! | `Request information`  | `RequestMethod`, `RequestPath`, `RequestHeaders`, `RequestBody`        |
//! | `Response information` | `RequestMethod`, `RequestPath`, `Host`, `statusCode`, `RequestBody`, `ResponseBody` |
//! | `HTTP request completed` | `RequestMethod`, `RequestPath`, `StatusCode`, `Elapsed`              |
//!
//! All of them run inside a `request` span carrying `RequestId` and, when an
//! authenticated [`Principal`] is present, `UserName`. The span is created at
//! `ERROR` level so it stays enabled under any level filter. The default sink
//! also writes `UserName` on each event itself.
//!
//! `RequestHeaders` is a nested map in the serialized [`LogEvent`]. `tracing`
//! fields are flat, so [`TracingSink`] records it as the JSON encoding of
//! that map.
//!
//! ## Configuration
//!
//! See [`Config`] for the `BODYLOG_*` environment variables. Where events go
//! is decided by the [`LogSink`] passed to [`RequestLogger::with_sink`];
//! by default they become `tracing` events.

pub mod config;
pub mod error;
pub mod identity;
pub mod logger;
pub mod middleware;
pub mod prelude;
pub mod request_body_capture;
pub mod response_body_capture;
pub mod sink;
pub mod telemetry;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::LogError;
pub use identity::{IdentityResolver, LogContext, Principal};
pub use logger::LogEvent;
pub use middleware::RequestLogger;
pub use sink::{LogSink, MemorySink, TracingSink};
