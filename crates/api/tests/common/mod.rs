//! Shared fixtures for the HTTP integration tests

#![allow(dead_code, clippy::unwrap_used)]

use std::{path::Path, sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use sites_api::{
    config::LogFormat,
    notify::{Message, Notifier, TransportError},
    routes::create_app,
    subscribers::{JsonFileRepository, SubscriberRepository},
    AppState, Config,
};
use sites_shared::Subscriber;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

// ============================================================================
// Notifiers
// ============================================================================

/// Forwards every delivery to a channel so tests can observe dispatch
pub struct ChannelNotifier(pub mpsc::UnboundedSender<(String, Message)>);

#[async_trait]
impl Notifier for ChannelNotifier {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn send(&self, destination: &str, message: &Message) -> Result<(), TransportError> {
        let _ = self.0.send((destination.to_string(), message.clone()));
        Ok(())
    }
}

/// Always fails, like an unreachable mail transport
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn send(&self, _destination: &str, _message: &Message) -> Result<(), TransportError> {
        Err(TransportError::Exit("exit status: 75".to_string()))
    }
}

// ============================================================================
// Test application
// ============================================================================

pub struct TestApp {
    pub app: Router,
    pub dir: TempDir,
}

impl TestApp {
    pub fn subscribers_path(&self) -> std::path::PathBuf {
        self.dir.path().join("data").join("subscribers.json")
    }

    pub fn stored(&self) -> Vec<Subscriber> {
        match std::fs::read(self.subscribers_path()) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap(),
            Err(_) => Vec::new(),
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, host: Option<&str>, uri: &str) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(host) = host {
            builder = builder.header(header::HOST, host);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn subscribe(&self, host: Option<&str>, body: &str) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/subscribe")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(host) = host {
            builder = builder.header(header::HOST, host);
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

pub fn test_config(dir: &Path) -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_string(),
        public_url: "https://kaigritun.com".to_string(),
        content_dir: dir.join("public"),
        max_request_body_bytes: 1024,
        subscribers_path: dir.join("data").join("subscribers.json"),
        enable_notifications: true,
        resend_api_key: String::new(),
        resend_api_url: "http://127.0.0.1:9".to_string(),
        email_from: "guides@kaigritun.com".to_string(),
        notify_command: None,
        notify_timeout: Duration::from_secs(1),
        log_format: LogFormat::Pretty,
    }
}

/// Lay out a content tree with the main site and two tenant subtrees
fn write_content(root: &Path) {
    let files = [
        ("index.html", "<h1>Kai Gritun</h1>"),
        ("about.html", "<h1>About Kai</h1>"),
        ("404.html", "<h1>Page not found</h1>"),
        ("_next/static/app.js", "console.log('app');"),
        ("sites/getthejobai/index.html", "<h1>GetTheJobAI</h1>"),
        ("sites/getthejobai/pricing.html", "<h1>GetTheJobAI pricing</h1>"),
        ("sites/gigwithai/index.html", "<h1>GigWithAI</h1>"),
        ("sites/gigwithai/guides/first-ai-gig/index.html", "<h1>First AI gig</h1>"),
    ];

    for (relative, contents) in files {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
}

pub fn spawn_app_with(notifier: Arc<dyn Notifier>, config: impl FnOnce(&mut Config)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    write_content(&dir.path().join("public"));

    let mut cfg = test_config(dir.path());
    config(&mut cfg);

    let repository: Arc<dyn SubscriberRepository> =
        Arc::new(JsonFileRepository::new(cfg.subscribers_path.clone()));
    let state = AppState::new(cfg, repository, notifier);

    TestApp {
        app: create_app(state),
        dir,
    }
}

/// App wired to a channel notifier; the receiver sees every dispatched message
pub fn spawn_app() -> (TestApp, mpsc::UnboundedReceiver<(String, Message)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = spawn_app_with(Arc::new(ChannelNotifier(tx)), |_| {});
    (app, rx)
}

// ============================================================================
// Response helpers
// ============================================================================

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn expect_page(response: Response<Body>, contains: &str) {
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(contains), "expected {contains:?} in {body:?}");
}
