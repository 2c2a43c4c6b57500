//! Email delivery via the Resend API

use std::time::Duration;

use async_trait::async_trait;

use super::{Message, Notifier, TransportError};

/// Default Resend API base URL
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";

/// Sends messages as transactional email through Resend
#[derive(Clone)]
pub struct ResendNotifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    email_from: String,
}

impl std::fmt::Debug for ResendNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendNotifier")
            .field("api_url", &self.api_url)
            .field("email_from", &self.email_from)
            .finish_non_exhaustive()
    }
}

impl ResendNotifier {
    /// Create a notifier. `timeout` bounds the whole request.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        email_from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            email_from: email_from.into(),
        })
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, destination: &str, message: &Message) -> Result<(), TransportError> {
        if self.api_key.is_empty() {
            return Err(TransportError::NotConfigured);
        }

        let body = serde_json::json!({
            "from": self.email_from,
            "to": [destination],
            "subject": message.subject,
            "html": message.html,
            "text": message.text,
        });

        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
