//! Sites API Library
//!
//! Serves several marketing sites from one deployment: host based routing
//! into per-site content subtrees, plus a shared email subscription API.

pub mod config;
pub mod error;
pub mod notify;
pub mod routes;
pub mod routing;
pub mod security;
pub mod state;
pub mod subscribers;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routing::{HostRouter, HostRouting, RouteDecision};
pub use state::AppState;
