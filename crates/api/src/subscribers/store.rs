//! Subscription workflow: validate, deduplicate, persist

use std::sync::Arc;

use sites_shared::{Site, Subscriber, SubscriberEmail, ValidationError};
use tokio::sync::Mutex;

use super::repository::{RepositoryError, SubscriberRepository};

/// Result of a successful `subscribe` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// A new record was persisted
    Subscribed(Subscriber),
    /// The `(email, site)` pair was already stored; nothing was written
    AlreadySubscribed,
}

impl SubscribeOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Subscribed(_))
    }
}

/// Errors returned by `subscribe`
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to persist subscriber: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Subscriber store over a pluggable repository.
///
/// The load-append-save cycle runs under a single async lock, so concurrent
/// subscriptions in this process never overwrite each other. Several
/// processes sharing one backing file are not coordinated.
#[derive(Clone)]
pub struct SubscriberStore {
    repository: Arc<dyn SubscriberRepository>,
    write_lock: Arc<Mutex<()>>,
}

impl SubscriberStore {
    pub fn new(repository: Arc<dyn SubscriberRepository>) -> Self {
        Self {
            repository,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Subscribe `email` to `site`.
    ///
    /// Validation happens before any storage access. Repeated submissions of
    /// the same pair (email compared case-insensitively) succeed without
    /// writing.
    #[tracing::instrument(name = "Subscribe", skip_all, fields(site = %site))]
    pub async fn subscribe(
        &self,
        email: &str,
        site: &str,
    ) -> Result<SubscribeOutcome, SubscribeError> {
        let email = SubscriberEmail::parse(email)?;
        let site = Site::parse(site)?;

        let _guard = self.write_lock.lock().await;

        let mut subscribers = self.repository.load().await?;

        if subscribers.iter().any(|s| s.matches(&email, site)) {
            tracing::info!(site = %site, email = %email, "Repeat subscription");
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }

        let subscriber = Subscriber::new(email, site);
        subscribers.push(subscriber.clone());
        self.repository.save(&subscribers).await?;

        tracing::info!(
            site = %subscriber.site,
            email = %subscriber.email,
            total = subscribers.len(),
            "New subscriber"
        );

        Ok(SubscribeOutcome::Subscribed(subscriber))
    }

    /// Number of stored records. Fails when the backend reports it cannot
    /// be read, even though `subscribe` would treat it as empty.
    pub async fn count(&self) -> Result<usize, RepositoryError> {
        self.repository.check().await?;
        Ok(self.repository.load().await?.len())
    }
}
