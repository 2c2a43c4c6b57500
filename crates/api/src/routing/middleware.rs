//! Host routing middleware
//!
//! Rewrites the request URI before route matching, so it must wrap the whole
//! `Router` rather than being added with `Router::layer`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::HOST, Uri},
    middleware::Next,
    response::Response,
};

use super::{AssetExclusions, HostRouter, RouteDecision};

/// Host router plus the asset exclusion list evaluated in front of it
#[derive(Debug, Clone, Default)]
pub struct HostRouting {
    pub router: HostRouter,
    pub assets: AssetExclusions,
}

impl HostRouting {
    pub fn new(router: HostRouter, assets: AssetExclusions) -> Self {
        Self { router, assets }
    }

    /// Full decision for a request, including the asset short-circuit
    pub fn decide(&self, host: Option<&str>, path: &str) -> RouteDecision {
        if self.assets.is_excluded(path) {
            return RouteDecision::PassThrough;
        }
        self.router.decide(host, path)
    }
}

/// Middleware that rewrites tenant requests into their content subtree
pub async fn host_routing_middleware(
    State(routing): State<Arc<HostRouting>>,
    mut request: Request,
    next: Next,
) -> Response {
    let host = request_host(&request);
    let path = request.uri().path().to_string();

    if let RouteDecision::Rewrite(new_path) = routing.decide(host.as_deref(), &path) {
        match rewrite_uri(request.uri(), &new_path) {
            Some(uri) => {
                tracing::debug!(
                    host = host.as_deref().unwrap_or_default(),
                    from = %path,
                    to = %new_path,
                    "Rewrote tenant request"
                );
                *request.uri_mut() = uri;
            }
            None => {
                tracing::warn!(path = %path, rewrite = %new_path, "Invalid rewritten URI, serving original path");
            }
        }
    }

    next.run(request).await
}

/// Host header, falling back to the URI authority (HTTP/2 `:authority`)
fn request_host(request: &Request) -> Option<String> {
    request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
}

/// Replace the path of `uri`, keeping its query string
fn rewrite_uri(uri: &Uri, new_path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", new_path, query),
        None => new_path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    Uri::from_parts(parts).ok()
}
