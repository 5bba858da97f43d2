//! Basic usage example for bodylog_actix
//!
//! Run with:
//! ```bash
//! RUST_LOG=info cargo run --example basic_usage
//! ```
//!
//! Then send a request carrying a user name and a body:
//! ```bash
//! curl -H 'x-user: alice' -d '{"a":"hello"}' http://localhost:8080/echo
//! ```

use actix_web::{dev::Service, web, App, HttpMessage, HttpResponse, HttpServer};
use bodylog_actix::{telemetry, Principal, RequestLogger};

async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Hello from bodylog!")
}

async fn health() -> HttpResponse {
    tracing::info!("health check");
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "example-app"
    }))
}

async fn echo(body: String) -> HttpResponse {
    HttpResponse::Ok().body(body)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = telemetry::init_subscriber("info", telemetry::LogFormat::Json) {
        eprintln!("tracing already initialised: {e}");
    }

    tracing::info!(addr = "0.0.0.0:8080", "starting example server");

    HttpServer::new(|| {
        App::new()
            .wrap(RequestLogger::new())
            // Stand-in for a real auth layer: trusts the x-user header
            .wrap_fn(|req, srv| {
                let user = req
                    .headers()
                    .get("x-user")
                    .and_then(|v| v.to_str().ok())
                    .map(Principal::named);
                if let Some(principal) = user {
                    req.extensions_mut().insert(principal);
                }
                srv.call(req)
            })
            .service(web::resource("/").route(web::get().to(index)))
            .service(web::resource("/health").route(web::get().to(health)))
            .service(web::resource("/echo").route(web::post().to(echo)))
    })
    .bind("0.0.0.0:8080")?
    .run()
    .await
}
