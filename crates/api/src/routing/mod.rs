//! Host-based routing for tenant sites
//!
//! This module maps incoming Host headers to tenant content trees,
//! enabling one deployment to serve several sites:
//! - Primary domain: kaigritun.com -> default content
//! - Tenant domains: getthejobai.com, gigwithai.com -> /sites/<tenant>/...

mod assets;
mod host_router;
mod middleware;

pub use assets::AssetExclusions;
pub use host_router::{resolve, HostRouter, RouteDecision, TenantRoute, API_PREFIX, TENANT_ROUTES};
pub use middleware::{host_routing_middleware, HostRouting};
