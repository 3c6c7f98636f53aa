//! Authentication storage back ends
//!
//! Keyed string storage for tokens and the signed-in user. The memory
//! store serves tests and one-shot runs, the file store keeps a CLI
//! session between invocations and the Redis store shares sessions
//! between processes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error};
use crate::config::SessionConfig;
use crate::utils::errors::Result;

/// Keyed storage for authentication state
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, optionally expiring after `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Remove a value (absent keys are not an error)
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Build the store selected by the session configuration
pub async fn build_store(config: &SessionConfig) -> Result<Arc<dyn AuthStore>> {
    let store: Arc<dyn AuthStore> = match config {
        SessionConfig::Memory => Arc::new(MemoryAuthStore::new()),
        SessionConfig::File { path } => Arc::new(FileAuthStore::new(path)),
        SessionConfig::Redis { url, prefix } => Arc::new(RedisAuthStore::new(url, prefix).await?),
    };
    Ok(store)
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryAuthStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl: Option<Duration>) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

/// JSON file store
///
/// The whole map is rewritten on every change. Expiry is not tracked per
/// key; the session checks `auth_expiry` itself.
#[derive(Debug)]
pub struct FileAuthStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileAuthStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<HashMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) if data.trim().is_empty() => Ok(HashMap::new()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to read session file");
                Err(e.into())
            }
        }
    }

    async fn write_map(&self, values: &HashMap<String, String>) -> Result<()> {
        if values.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        let serialized = serde_json::to_string_pretty(values)?;
        let mut file = open_private(&self.path).await?;
        file.write_all(serialized.as_bytes()).await?;
        file.flush().await?;
        debug!(path = %self.path.display(), keys = values.len(), "Session file written");
        Ok(())
    }
}

/// Open `path` for rewriting, readable by the owner only on unix
async fn open_private(path: &Path) -> std::io::Result<tokio::fs::File> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let file = options.open(path).await?;
    // `mode` only applies on creation; tighten a file left by an older run
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }
    Ok(file)
}

#[async_trait]
impl AuthStore for FileAuthStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str, _ttl: Option<Duration>) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut values = self.read_map().await?;
        values.insert(key.to_string(), value.to_string());
        self.write_map(&values).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut values = self.read_map().await?;
        if values.remove(key).is_some() {
            self.write_map(&values).await?;
        }
        Ok(())
    }
}

/// Redis store with key prefix and TTL
#[derive(Clone)]
pub struct RedisAuthStore {
    connection_manager: redis::aio::ConnectionManager,
    prefix: String,
}

impl RedisAuthStore {
    pub async fn new(url: &str, prefix: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            prefix: prefix.to_string(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl std::fmt::Debug for RedisAuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisAuthStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthStore for RedisAuthStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = self.key(key);
        let mut conn = self.connection_manager.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(value) => {
                debug!(key = %key, has_data = value.is_some(), "Redis GET result");
                Ok(value)
            }
            Err(e) => {
                error!(key = %key, error = %e, "Failed to read session key from Redis");
                Err(e.into())
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let key = self.key(key);
        let mut conn = self.connection_manager.clone();

        match ttl {
            // Redis rejects a zero expiry
            Some(ttl) => conn.set_ex::<_, _, ()>(&key, value, ttl.as_secs().max(1)).await?,
            None => conn.set::<_, _, ()>(&key, value).await?,
        }
        debug!(key = %key, ttl_seconds = ttl.map(|t| t.as_secs()), "Session key saved to Redis");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = self.key(key);
        let mut conn = self.connection_manager.clone();
        let deleted: u32 = conn.del(&key).await?;
        debug!(key = %key, deleted = deleted, "Session key removed from Redis");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryAuthStore::new();
        store.set("auth_token", "abc", None).await.unwrap();
        assert_eq!(store.get("auth_token").await.unwrap().as_deref(), Some("abc"));

        store.remove("auth_token").await.unwrap();
        assert!(store.get("auth_token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileAuthStore::new(&path);
        store.set("auth_token", "abc", None).await.unwrap();
        store.set("user", r#"{"id":1}"#, None).await.unwrap();

        let reopened = FileAuthStore::new(&path);
        assert_eq!(reopened.get("auth_token").await.unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get("user").await.unwrap().as_deref(), Some(r#"{"id":1}"#));
    }

    #[tokio::test]
    async fn test_file_store_removes_file_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileAuthStore::new(&path);
        assert!(store.get("missing").await.unwrap().is_none());

        store.set("auth_token", "abc", None).await.unwrap();
        store.remove("auth_token").await.unwrap();
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileAuthStore::new(&path);
        store.set("refresh_token", "secret", None).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.get("refresh_token").await.unwrap().as_deref(), Some("secret"));
    }
}
