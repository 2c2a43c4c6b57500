//! Shared domain types for the multi-tenant sites backend
//!
//! This crate contains the subscriber model and its validation rules,
//! independent of the HTTP layer.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
