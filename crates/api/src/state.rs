//! Shared application state

use std::sync::Arc;

use crate::{
    config::Config,
    notify::{CommandNotifier, DisabledNotifier, Notifier, ResendNotifier, TransportError},
    subscribers::{JsonFileRepository, SubscriberRepository, SubscriberStore},
};

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: SubscriberStore,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Assemble state from explicit parts (used by tests)
    pub fn new(
        config: Config,
        repository: Arc<dyn SubscriberRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store: SubscriberStore::new(repository),
            notifier,
        }
    }

    /// Build the production state: JSON file store plus the configured notifier
    pub fn from_config(config: Config) -> Result<Self, TransportError> {
        let repository = Arc::new(JsonFileRepository::new(config.subscribers_path.clone()));
        let notifier = build_notifier(&config)?;

        tracing::info!(
            subscribers_path = %config.subscribers_path.display(),
            notifier = notifier.name(),
            "Application state initialized"
        );

        Ok(Self::new(config, repository, notifier))
    }
}

/// Pick a transport: Resend when an API key is set, else an external command,
/// else disabled.
pub fn build_notifier(config: &Config) -> Result<Arc<dyn Notifier>, TransportError> {
    if !config.enable_notifications {
        return Ok(Arc::new(DisabledNotifier));
    }

    if !config.resend_api_key.is_empty() {
        let notifier = ResendNotifier::new(
            config.resend_api_url.clone(),
            config.resend_api_key.clone(),
            config.email_from.clone(),
            config.notify_timeout,
        )?;
        return Ok(Arc::new(notifier));
    }

    if let Some(command) = config
        .notify_command
        .as_deref()
        .and_then(|c| CommandNotifier::from_command_line(c, config.email_from.clone(), config.notify_timeout))
    {
        return Ok(Arc::new(command));
    }

    tracing::warn!("No notification transport configured, welcome emails are disabled");
    Ok(Arc::new(DisabledNotifier))
}
