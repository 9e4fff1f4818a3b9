//! HTTP application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: component wiring (registry, store, log, engine, scorer)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: named request/response shapes and mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppConfig, AppServices};

/// Build the full router (public entrypoint used by `main` and the tests).
pub fn build_app(config: AppConfig) -> Router {
    let services = Arc::new(services::build_services(config));
    build_app_with(services)
}

/// Build the router around pre-wired services (tests reach in this way).
pub fn build_app_with(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        validator: services.token_validator(),
        revocations: services.revocations.clone(),
    };

    // Protected routes: require a live, unrevoked credential.
    let protected = routes::protected_router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router().layer(Extension(services)))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
