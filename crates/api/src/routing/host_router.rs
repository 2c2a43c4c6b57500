//! Host-to-Tenant Resolution
//!
//! Decides, from the Host header and request path, whether a request should be
//! served from a tenant's content subtree. Supports:
//! - Tenant root: getthejobai.com/ -> /sites/getthejobai
//! - Tenant pages: getthejobai.com/pricing -> /sites/getthejobai/pricing
//! - Shared API: getthejobai.com/api/* is never rewritten
//! - Primary domain: anything that matches no tenant is left untouched

/// Path prefix shared by all API routes, which are never tenant-scoped
pub const API_PREFIX: &str = "/api/";

/// A static mapping from a host substring to a content subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantRoute {
    /// Substring matched against the lowercased host (port included)
    pub host: &'static str,
    /// Path prefix of the tenant's content subtree, without trailing slash
    pub prefix: &'static str,
}

/// Tenant routes in priority order. Host substrings must stay disjoint so that
/// at most one route can apply to a request.
pub const TENANT_ROUTES: &[TenantRoute] = &[
    TenantRoute {
        host: "getthejobai.com",
        prefix: "/sites/getthejobai",
    },
    TenantRoute {
        host: "gigwithai.com",
        prefix: "/sites/gigwithai",
    },
];

/// Outcome of routing a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Serve the request as-is
    PassThrough,
    /// Serve the request from this internal path instead
    Rewrite(String),
}

impl TenantRoute {
    fn matches_host(&self, host: &str) -> bool {
        host.contains(self.host)
    }

    /// Whether `path` already lives under this route's prefix
    fn owns_path(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Stateless host router over an ordered list of tenant routes
#[derive(Debug, Clone)]
pub struct HostRouter {
    routes: Vec<TenantRoute>,
}

impl Default for HostRouter {
    fn default() -> Self {
        Self::new(TENANT_ROUTES.to_vec())
    }
}

impl HostRouter {
    /// Create a router over the given routes (evaluated in order)
    pub fn new(routes: Vec<TenantRoute>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[TenantRoute] {
        &self.routes
    }

    /// Decide how to serve `path` for a request addressed to `host`
    pub fn decide(&self, host: Option<&str>, path: &str) -> RouteDecision {
        resolve(host, path, &self.routes)
    }
}

/// Route a request to a tenant subtree.
///
/// Returns:
/// - `Rewrite(prefix)` for the root path of a tenant host
/// - `PassThrough` for API paths, paths already under the prefix, and hosts
///   that match no tenant (including a missing host)
/// - `Rewrite(prefix + path)` otherwise
pub fn resolve(host: Option<&str>, path: &str, routes: &[TenantRoute]) -> RouteDecision {
    let Some(host) = host.map(normalize_host).filter(|h| !h.is_empty()) else {
        return RouteDecision::PassThrough;
    };

    let Some(route) = routes.iter().find(|route| route.matches_host(&host)) else {
        return RouteDecision::PassThrough;
    };

    if path == "/" {
        return RouteDecision::Rewrite(route.prefix.to_string());
    }

    if path.starts_with(API_PREFIX) {
        return RouteDecision::PassThrough;
    }

    if route.owns_path(path) {
        return RouteDecision::PassThrough;
    }

    RouteDecision::Rewrite(format!("{}{}", route.prefix, path))
}

/// Normalize a host header value for matching
fn normalize_host(host: &str) -> String {
    host.trim().to_lowercase()
}
