//! Application configuration

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::notify::DEFAULT_RESEND_API_URL;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub public_url: String,
    pub content_dir: PathBuf,
    pub max_request_body_bytes: usize,

    // Storage
    pub subscribers_path: PathBuf,

    // Notifications
    pub enable_notifications: bool,
    pub resend_api_key: String,
    pub resend_api_url: String,
    pub email_from: String,
    pub notify_command: Option<String>,
    pub notify_timeout: Duration,

    // Logging
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let resend_api_key = env::var("RESEND_API_KEY").unwrap_or_default();

        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            content_dir: env::var("CONTENT_DIR")
                .unwrap_or_else(|_| "public".to_string())
                .into(),
            max_request_body_bytes: env::var("MAX_REQUEST_BODY_BYTES")
                .unwrap_or_else(|_| "65536".to_string())
                .trim()
                .parse()
                .map_err(|_| {
                    ConfigError::Invalid("MAX_REQUEST_BODY_BYTES", "must be a number of bytes")
                })?,

            // Storage
            subscribers_path: env::var("SUBSCRIBERS_PATH")
                .unwrap_or_else(|_| "data/subscribers.json".to_string())
                .into(),

            // Notifications
            enable_notifications: parse_flag(
                "ENABLE_NOTIFICATIONS",
                &env::var("ENABLE_NOTIFICATIONS").unwrap_or_else(|_| "true".to_string()),
            )?,
            email_from: {
                let from = env::var("EMAIL_FROM").unwrap_or_default();
                // Resend rejects messages without a verified sender
                if !resend_api_key.is_empty() && from.trim().is_empty() {
                    return Err(ConfigError::Missing("EMAIL_FROM"));
                }
                from
            },
            resend_api_key,
            resend_api_url: env::var("RESEND_API_URL")
                .unwrap_or_else(|_| DEFAULT_RESEND_API_URL.to_string()),
            notify_command: env::var("NOTIFY_COMMAND")
                .ok()
                .filter(|c| !c.trim().is_empty()),
            notify_timeout: {
                let raw = env::var("NOTIFY_TIMEOUT_MS").unwrap_or_else(|_| "10000".to_string());
                let ms: u64 = raw.parse().map_err(|_| {
                    ConfigError::Invalid("NOTIFY_TIMEOUT_MS", "must be a number of milliseconds")
                })?;
                Duration::from_millis(ms)
            },

            // Logging
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "json".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                _ => return Err(ConfigError::Invalid("LOG_FORMAT", "expected `json` or `pretty`")),
            },
        })
    }
}

/// Parse a boolean flag, accepting `true/false`, `1/0`, `yes/no` and `on/off`
fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(name, "expected true/false, 1/0, yes/no or on/off")),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
