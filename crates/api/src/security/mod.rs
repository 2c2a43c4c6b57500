//! Response hardening shared by every site

mod headers;

pub use headers::security_headers_middleware;
