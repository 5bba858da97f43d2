//! Actix-Web middleware capturing request and response bodies
//!
//! For every request the middleware:
//! 1. opens a `request` span carrying `RequestId` and `UserName`, so every log
//!    statement made while handling the request inherits the identity label,
//! 2. captures the request body and puts a replay of it back for the handler,
//! 3. emits the "Request information" event,
//! 4. awaits the wrapped service,
//! 5. buffers the response body and emits the "Response information" event,
//! 6. hands the buffered bytes to the client untouched,
//! 7. optionally emits one completion summary.

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::config::Config;
use crate::identity::{IdentityResolver, LogContext, PrincipalResolver};
use crate::logger::{forward_log, LogEvent, RequestCompleted, RequestLogged, ResponseLogged};
use crate::request_body_capture::capture_request_body;
use crate::response_body_capture::capture_response_body;
use crate::sink::{LogSink, TracingSink};
use crate::utils::{display_url, generate_request_id, headers_to_map, redact_headers, CapturedBody};

/// Request/response body logging middleware for Actix-Web
///
/// ```rust,no_run
/// use actix_web::{web, App, HttpResponse};
/// use bodylog_actix::RequestLogger;
///
/// let app = App::new()
///     .wrap(RequestLogger::new())
///     .route("/", web::get().to(|| async { HttpResponse::Ok().body("hi") }));
/// ```
#[derive(Clone)]
pub struct RequestLogger {
    config: Arc<Config>,
    sink: Arc<dyn LogSink>,
    identity: Arc<dyn IdentityResolver>,
}

impl RequestLogger {
    /// Environment configuration, `tracing` output, identity from [`crate::Principal`]
    pub fn new() -> Self {
        Self::with_config(Config::from_env())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config: config.into_arc(),
            sink: Arc::new(TracingSink),
            identity: Arc::new(PrincipalResolver),
        }
    }

    /// Send events somewhere other than `tracing`
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Derive the identity label some other way than from [`crate::Principal`]
    pub fn with_identity_resolver(mut self, resolver: impl IdentityResolver + 'static) -> Self {
        self.identity = Arc::new(resolver);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLoggerService {
            service: Rc::new(service),
            config: self.config.clone(),
            sink: self.sink.clone(),
            identity: self.identity.clone(),
        })
    }
}

/// The service that handles each request
pub struct RequestLoggerService<S> {
    service: Rc<S>,
    config: Arc<Config>,
    sink: Arc<dyn LogSink>,
    identity: Arc<dyn IdentityResolver>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let request_id = generate_request_id();
        let user_name = self.identity.resolve(&req);

        // Every event of this request, including the handler's own, runs
        // inside this span. Concurrent requests each get their own. ERROR
        // level keeps it enabled under any filter that lets an event through.
        let span = tracing::error_span!(
            "request",
            RequestId = %request_id,
            UserName = user_name.as_deref(),
        );

        req.extensions_mut().insert(LogContext {
            request_id,
            user_name: user_name.clone(),
        });

        let exchange = Exchange {
            method: req.method().to_string(),
            path: req.path().to_string(),
            host: {
                let info = req.connection_info();
                display_url(info.scheme(), info.host(), req.uri())
            },
            user_name,
        };

        let service = Rc::clone(&self.service);
        let config = Arc::clone(&self.config);
        let sink = Arc::clone(&self.sink);

        Box::pin(
            async move {
                let result = if config.capture_bodies {
                    intercept(req, service.as_ref(), &config, sink.as_ref(), &exchange).await
                } else {
                    service.call(req).await.map(ServiceResponse::map_into_boxed_body)
                };

                if config.completion_summary {
                    let status = match &result {
                        Ok(res) => res.status(),
                        Err(e) => e.as_response_error().status_code(),
                    };
                    forward_log(
                        LogEvent::Completed(RequestCompleted {
                            user_name: exchange.user_name.clone(),
                            method: exchange.method.clone(),
                            path: exchange.path.clone(),
                            status_code: status.as_u16(),
                            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
                        }),
                        sink.as_ref(),
                    );
                }

                result
            }
            .instrument(span),
        )
    }
}

/// Request facts shared by every event of one exchange
struct Exchange {
    method: String,
    path: String,
    host: String,
    user_name: Option<String>,
}

async fn intercept<S, B>(
    mut req: ServiceRequest,
    service: &S,
    config: &Config,
    sink: &dyn LogSink,
    exchange: &Exchange,
) -> Result<ServiceResponse<BoxBody>, Error>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody + 'static,
{
    let request_body = capture_request_body(&mut req, config.max_body_size).await.text();

    let mut headers = headers_to_map(req.headers());
    if config.redact_headers {
        redact_headers(&mut headers);
    }

    forward_log(
        LogEvent::Request(RequestLogged {
            user_name: exchange.user_name.clone(),
            method: exchange.method.clone(),
            path: exchange.path.clone(),
            headers,
            body: request_body.clone(),
        }),
        sink,
    );

    // A failed handler never produced a body; nothing to copy back
    let res = service.call(req).await?;
    let (res, response_bytes) = capture_response_body(res).await?;

    forward_log(
        LogEvent::Response(ResponseLogged {
            user_name: exchange.user_name.clone(),
            method: exchange.method.clone(),
            path: exchange.path.clone(),
            host: exchange.host.clone(),
            status_code: res.status().as_u16(),
            request_body,
            response_body: CapturedBody::bounded(&response_bytes, config.max_body_size).text(),
        }),
        sink,
    );

    Ok(res)
}
