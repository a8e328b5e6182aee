//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: gateway selection (in-memory, filesystem, Postgres)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use consign_infra::GatewayError;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> Result<Router, GatewayError> {
    let services = services::build_services(config).await?;
    Ok(build_app_with(config, services))
}

/// Build the router around already-wired services.
pub fn build_app_with(config: &ApiConfig, services: services::AppServices) -> Router {
    let jwt = Arc::new(consign_auth::Hs256JwtValidator::new(
        config.jwt_secret.clone().into_bytes(),
    ));
    let services = Arc::new(services);
    let auth_state = middleware::AuthState {
        jwt,
        services: services.clone(),
    };

    // Protected routes: require a verified session.
    let protected = routes::router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/images/:id/:filename", get(routes::images::serve_image))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
