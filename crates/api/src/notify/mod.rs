//! Best-effort subscriber notifications
//!
//! After a new subscription is persisted, a fixed welcome message for the
//! site is sent through a `Notifier`. Delivery runs on a detached task with a
//! single attempt; failures are logged and never reach the caller.

mod command;
mod resend;
mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use sites_shared::{Site, SubscriberEmail};

pub use command::CommandNotifier;
pub use resend::{ResendNotifier, DEFAULT_RESEND_API_URL};
pub use templates::welcome_message;

/// Outbound message with a fixed body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Errors raised by a notification transport
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Transport not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to run notification command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Notification command exited with {0}")]
    Exit(String),

    #[error("Notification timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Capability to deliver a message to one address
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short transport name for logs
    fn name(&self) -> &'static str;

    async fn send(&self, destination: &str, message: &Message) -> Result<(), TransportError>;
}

/// Notifier used when no transport is configured
#[derive(Debug, Clone, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn send(&self, _destination: &str, message: &Message) -> Result<(), TransportError> {
        tracing::debug!(subject = %message.subject, "Notifications disabled, skipping");
        Ok(())
    }
}

/// Send the site's welcome message once. Errors are logged and swallowed.
pub async fn send_welcome(
    notifier: &dyn Notifier,
    email: &SubscriberEmail,
    site: Site,
    public_url: &str,
) {
    let message = welcome_message(site, public_url);

    match notifier.send(email.as_ref(), &message).await {
        Ok(()) => {
            tracing::info!(site = %site, transport = notifier.name(), "Welcome message sent");
        }
        Err(e) => {
            tracing::error!(
                site = %site,
                transport = notifier.name(),
                error = %e,
                "Failed to send welcome message"
            );
        }
    }
}

/// Hand the welcome message off to a background task (fire and forget)
pub fn dispatch_welcome(
    notifier: Arc<dyn Notifier>,
    email: SubscriberEmail,
    site: Site,
    public_url: String,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        send_welcome(notifier.as_ref(), &email, site, &public_url).await;
    })
}
