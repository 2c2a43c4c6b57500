//! Static asset exclusion list
//!
//! Asset requests and health checks are shared by every tenant and must
//! never be rewritten, so they are filtered out before host routing runs.

/// Path prefixes that always denote static assets
const ASSET_PREFIXES: &[&str] = &["/_next/static/", "/_next/image", "/assets/", "/static/"];

/// Exact paths that are served from the shared root, health checks included
const ASSET_PATHS: &[&str] = &["/favicon.ico", "/health", "/health/live"];

/// File extensions (lowercase, without dot) treated as static assets
const ASSET_EXTENSIONS: &[&str] = &[
    "svg", "png", "jpg", "jpeg", "gif", "webp", "ico", "css", "js", "map", "woff", "woff2", "ttf",
];

/// Path patterns excluded from host routing
#[derive(Debug, Clone)]
pub struct AssetExclusions {
    prefixes: Vec<&'static str>,
    paths: Vec<&'static str>,
    extensions: Vec<&'static str>,
}

impl Default for AssetExclusions {
    fn default() -> Self {
        Self {
            prefixes: ASSET_PREFIXES.to_vec(),
            paths: ASSET_PATHS.to_vec(),
            extensions: ASSET_EXTENSIONS.to_vec(),
        }
    }
}

impl AssetExclusions {
    /// Whether `path` is a static asset that bypasses host routing
    pub fn is_excluded(&self, path: &str) -> bool {
        if self.paths.contains(&path) {
            return true;
        }

        if self.prefixes.iter().any(|prefix| path.starts_with(prefix)) {
            return true;
        }

        // Only the last segment carries an extension
        let last_segment = path.rsplit('/').next().unwrap_or(path);
        match last_segment.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            _ => false,
        }
    }
}
