//! HTTP routes

pub mod content;
pub mod health;
pub mod subscribe;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower::Layer;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{
    routing::{host_routing_middleware, HostRouting},
    security::security_headers_middleware,
    state::AppState,
};

/// Create all routes, matched against the already rewritten path
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness));

    // Shared API, never rewritten by host routing
    let api_routes = Router::new()
        .route("/subscribe", post(subscribe::subscribe))
        .layer(DefaultBodyLimit::max(state.config.max_request_body_bytes));

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .fallback(content::serve_content)
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// Create the full application: host routing wrapped around the routes,
/// with tracing and security headers on the outside.
pub fn create_app(state: AppState) -> Router {
    create_app_with_routing(state, HostRouting::default())
}

/// Same as [`create_app`] with an explicit host routing table
pub fn create_app_with_routing(state: AppState, routing: HostRouting) -> Router {
    let routed = middleware::from_fn_with_state(Arc::new(routing), host_routing_middleware)
        .layer(create_router(state));

    Router::new()
        .fallback_service(routed)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
}
