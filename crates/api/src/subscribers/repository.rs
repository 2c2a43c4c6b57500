//! Subscriber persistence backends
//!
//! The store loads the full collection, appends, and saves it back. Backends
//! only need to provide whole-collection `load` and `save`, plus an optional
//! strict `check` behind the health endpoint.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use sites_shared::Subscriber;
use time::OffsetDateTime;
use tokio::sync::Mutex;

/// Errors raised by a subscriber backend
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize subscribers: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Whole-collection storage for subscriber records
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Load every stored record. A missing store is an empty collection.
    async fn load(&self) -> Result<Vec<Subscriber>, RepositoryError>;

    /// Replace the stored collection. Must be all-or-nothing.
    async fn save(&self, subscribers: &[Subscriber]) -> Result<(), RepositoryError>;

    /// Strict readability check behind `/health`. Unlike `load`, problems
    /// other than a missing store are reported.
    async fn check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// =============================================================================
// JSON file backend
// =============================================================================

/// Entries of a subscriber file, split by whether they decode as records
#[derive(Debug, Default)]
struct StoredEntries {
    subscribers: Vec<Subscriber>,
    /// Entries kept verbatim (e.g. retired site ids, foreign timestamps)
    unrecognized: Vec<serde_json::Value>,
}

impl StoredEntries {
    /// Decode a JSON array entry by entry. Fails only when the file is not
    /// a JSON array at all.
    fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let entries: Vec<serde_json::Value> = serde_json::from_slice(bytes)?;
        let mut decoded = Self::default();

        for entry in entries {
            match Subscriber::deserialize(&entry) {
                Ok(subscriber) => decoded.subscribers.push(subscriber),
                Err(_) => decoded.unrecognized.push(entry),
            }
        }

        Ok(decoded)
    }
}

/// Stores subscribers as a pretty-printed JSON array in a single file.
///
/// Entries that do not decode as records are skipped by `load` but written
/// back unchanged by `save`. A file that is not a JSON array is moved aside
/// to `<name>.corrupt-<unix time>` before it is replaced.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the store file with `suffix` appended to its name
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "subscribers.json".into());
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Sibling file the new collection is written to before the rename
    fn staging_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> RepositoryError {
        RepositoryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Entries of the current file that must survive a rewrite.
    ///
    /// An existing file that cannot be read is an error: replacing it could
    /// drop records we never saw.
    async fn entries_to_keep(&self) -> Result<Vec<serde_json::Value>, RepositoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(&self.path, e)),
        };

        match StoredEntries::decode(&bytes) {
            Ok(entries) => Ok(entries.unrecognized),
            Err(e) => {
                let corrupt = self.sibling(&format!(
                    ".corrupt-{}",
                    OffsetDateTime::now_utc().unix_timestamp()
                ));
                tokio::fs::rename(&self.path, &corrupt)
                    .await
                    .map_err(|e| self.io_error(&corrupt, e))?;
                tracing::warn!(
                    error = %e,
                    moved_to = %corrupt.display(),
                    "Subscriber file is not a JSON array, moved aside"
                );
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl SubscriberRepository for JsonFileRepository {
    #[tracing::instrument(name = "Load subscribers", skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<Subscriber>, RepositoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                tracing::warn!(error = %e, "Subscriber file unreadable, treating as empty");
                return Ok(Vec::new());
            }
        };

        match StoredEntries::decode(&bytes) {
            Ok(entries) => {
                if !entries.unrecognized.is_empty() {
                    tracing::warn!(
                        skipped = entries.unrecognized.len(),
                        "Subscriber file has unrecognized entries, keeping them as-is"
                    );
                }
                Ok(entries.subscribers)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Subscriber file is not a JSON array, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    #[tracing::instrument(
        name = "Save subscribers",
        skip(self, subscribers),
        fields(path = %self.path.display(), count = subscribers.len())
    )]
    async fn save(&self, subscribers: &[Subscriber]) -> Result<(), RepositoryError> {
        let mut entries = self.entries_to_keep().await?;
        for subscriber in subscribers {
            entries.push(serde_json::to_value(subscriber)?);
        }
        let contents = serde_json::to_vec_pretty(&entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(parent, e))?;
        }

        // Write the whole collection aside, then swap it in with a rename so a
        // failed write never truncates the existing file.
        let staging = self.staging_path();
        if let Err(e) = tokio::fs::write(&staging, &contents).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(self.io_error(&staging, e));
        }

        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(self.io_error(&self.path, e));
        }

        Ok(())
    }

    async fn check(&self) -> Result<(), RepositoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(self.io_error(&self.path, e)),
        };

        StoredEntries::decode(&bytes).map(|_| ()).map_err(|e| {
            RepositoryError::Unavailable(format!("subscriber file is not a JSON array: {e}"))
        })
    }
}

// =============================================================================
// In-memory backend
// =============================================================================

/// In-memory backend for tests and local development.
///
/// Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository(Arc<Mutex<Vec<Subscriber>>>);

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with records
    pub fn with_subscribers(subscribers: Vec<Subscriber>) -> Self {
        Self(Arc::new(Mutex::new(subscribers)))
    }

    /// Copy of the currently stored records
    pub async fn snapshot(&self) -> Vec<Subscriber> {
        self.0.lock().await.clone()
    }
}

#[async_trait]
impl SubscriberRepository for InMemoryRepository {
    async fn load(&self) -> Result<Vec<Subscriber>, RepositoryError> {
        Ok(self.0.lock().await.clone())
    }

    async fn save(&self, subscribers: &[Subscriber]) -> Result<(), RepositoryError> {
        *self.0.lock().await = subscribers.to_vec();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sites_shared::{Site, SubscriberEmail};

    fn subscriber(email: &str, site: Site) -> Subscriber {
        Subscriber::new(SubscriberEmail::parse(email).unwrap(), site)
    }

    #[tokio::test]
    async fn test_missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("subscribers.json"));

        assert!(repo.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscribers.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let repo = JsonFileRepository::new(path);
        assert!(repo.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_moved_aside_before_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscribers.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let repo = JsonFileRepository::new(&path);

        let records = vec![subscriber("a@b.co", Site::Kaigritun)];
        repo.save(&records).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), records);
        let moved: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with("subscribers.json.corrupt-")
            })
            .collect();
        assert_eq!(moved.len(), 1);
        assert_eq!(std::fs::read(&moved[0]).unwrap(), b"{ not json");
    }

    #[tokio::test]
    async fn test_unrecognized_entries_survive_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscribers.json");
        std::fs::write(
            &path,
            r#"[
                {"email": "a@b.co", "site": "kaigritun", "subscribedAt": "2024-01-01T00:00:00Z"},
                {"email": "c@d.co", "site": "oldsite", "subscribedAt": "2023-05-01T00:00:00Z"},
                {"email": "e@f.co", "site": "gigwithai", "subscribedAt": "last tuesday"}
            ]"#,
        )
        .unwrap();
        let repo = JsonFileRepository::new(&path);

        let mut records = repo.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email.as_ref(), "a@b.co");

        records.push(subscriber("new@x.co", Site::Kaigritun));
        repo.save(&records).await.unwrap();

        let raw: Vec<serde_json::Value> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let emails: Vec<&str> = raw.iter().map(|e| e["email"].as_str().unwrap()).collect();
        assert_eq!(raw.len(), 4);
        for email in ["a@b.co", "c@d.co", "e@f.co", "new@x.co"] {
            assert!(emails.contains(&email), "{email} missing from {emails:?}");
        }
        let legacy = raw.iter().find(|e| e["email"] == "c@d.co").unwrap();
        assert_eq!(legacy["site"], "oldsite");
        assert_eq!(legacy["subscribedAt"], "2023-05-01T00:00:00Z");

        assert_eq!(repo.load().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_check_reports_unusable_store() {
        let dir = tempfile::tempdir().unwrap();

        let missing = JsonFileRepository::new(dir.path().join("subscribers.json"));
        assert!(missing.check().await.is_ok());

        let as_directory = JsonFileRepository::new(dir.path());
        assert!(matches!(
            as_directory.check().await,
            Err(RepositoryError::Io { .. })
        ));
        assert!(as_directory.load().await.unwrap().is_empty());

        let corrupt_path = dir.path().join("corrupt.json");
        std::fs::write(&corrupt_path, b"{ not json").unwrap();
        assert!(matches!(
            JsonFileRepository::new(corrupt_path).check().await,
            Err(RepositoryError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_unreadable_existing_file_is_never_replaced() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read back
        let path = dir.path().join("subscribers.json");
        std::fs::create_dir(&path).unwrap();
        let repo = JsonFileRepository::new(&path);

        let result = repo.save(&[subscriber("a@b.co", Site::Kaigritun)]).await;

        assert!(matches!(result, Err(RepositoryError::Io { .. })));
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("subscribers.json");
        let repo = JsonFileRepository::new(&path);

        let records = vec![subscriber("a@b.co", Site::GigWithAi)];
        repo.save(&records).await.unwrap();

        assert!(path.exists());
        assert_eq!(repo.load().await.unwrap(), records);
        assert!(!repo.staging_path().exists());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_previous_file_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscribers.json");
        let repo = JsonFileRepository::new(&path);

        let original = vec![subscriber("first@b.co", Site::Kaigritun)];
        repo.save(&original).await.unwrap();
        let before = std::fs::read(&path).unwrap();

        // A directory squatting on the staging path makes the write fail
        std::fs::create_dir(repo.staging_path()).unwrap();

        let updated = vec![
            subscriber("first@b.co", Site::Kaigritun),
            subscriber("second@b.co", Site::Kaigritun),
        ];
        let result = repo.save(&updated).await;

        assert!(matches!(result, Err(RepositoryError::Io { .. })));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_unwritable_location_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let repo = JsonFileRepository::new(blocker.join("subscribers.json"));
        let result = repo.save(&[subscriber("a@b.co", Site::Kaigritun)]).await;

        assert!(matches!(result, Err(RepositoryError::Io { .. })));
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let repo = InMemoryRepository::new();
        let records = vec![subscriber("a@b.co", Site::GetTheJobAi)];

        repo.save(&records).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), records);
        assert_eq!(repo.snapshot().await, records);
    }
}
