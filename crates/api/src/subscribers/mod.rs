//! Email subscriber storage
//!
//! Validated `(email, site)` pairs are appended to a durable collection,
//! deduplicated on the pair.

mod repository;
mod store;

pub use repository::{InMemoryRepository, JsonFileRepository, RepositoryError, SubscriberRepository};
pub use store::{SubscribeError, SubscribeOutcome, SubscriberStore};
