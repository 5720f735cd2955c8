//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage wiring (in-memory table or Postgres pool)
//! - `product_service.rs`: application service shaping repository envelopes into DTOs
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: envelope and error responses

use std::sync::Arc;

use axum::http::header::{self, InvalidHeaderValue};
use axum::http::{HeaderValue, Method};
use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod errors;
pub mod product_service;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
///
/// `allowed_origin` restricts CORS to one origin; `None` allows any.
pub fn build_app(
    services: AppServices,
    allowed_origin: Option<&str>,
) -> Result<Router, InvalidHeaderValue> {
    let cors = cors_layer(allowed_origin)?;

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(Extension(Arc::new(services))),
        ))
}

fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer, InvalidHeaderValue> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(match allowed_origin {
        Some(origin) => cors.allow_origin(origin.parse::<HeaderValue>()?),
        None => cors.allow_origin(Any),
    })
}
