//! Content tree serving
//!
//! Every non-API path is looked up under the content directory. After host
//! routing, tenant requests arrive here already prefixed with their subtree,
//! e.g. `/sites/getthejobai/pricing`.

use std::path::{Component, Path, PathBuf};

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::state::AppState;

/// Serve the file backing the request path, trying `<path>`, `<path>.html`
/// and `<path>/index.html` in that order.
pub async fn serve_content(State(state): State<AppState>, request: Request) -> Response {
    let root = state.config.content_dir.as_path();

    let Some(relative) = sanitize_path(request.uri().path()) else {
        return not_found(root).await;
    };

    for candidate in candidates(root, &relative) {
        if is_file(&candidate).await {
            return match ServeFile::new(&candidate).oneshot(request).await {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            };
        }
    }

    not_found(root).await
}

/// Turn a URL path into a relative filesystem path, rejecting traversal
fn sanitize_path(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment.contains('\\') {
            return None;
        }
        match Path::new(segment).components().next() {
            Some(Component::Normal(part)) if Path::new(segment).components().count() == 1 => {
                relative.push(part)
            }
            _ => return None,
        }
    }

    Some(relative)
}

fn candidates(root: &Path, relative: &Path) -> Vec<PathBuf> {
    if relative.as_os_str().is_empty() {
        return vec![root.join("index.html")];
    }

    let exact = root.join(relative);
    let mut with_html = exact.clone().into_os_string();
    with_html.push(".html");

    vec![exact.clone(), PathBuf::from(with_html), exact.join("index.html")]
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// 404 response, using `404.html` from the content root when present
async fn not_found(root: &Path) -> Response {
    match tokio::fs::read_to_string(root.join("404.html")).await {
        Ok(page) => (StatusCode::NOT_FOUND, Html(page)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}
