//! Cache storage backends
//!
//! A cache storage is a set of named buckets. The worker only needs to
//! enumerate bucket names and delete buckets by name.

use crate::error::{HandoffError, HandoffResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

/// Named cache buckets with enumerate and delete-by-name
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Names of all buckets currently stored
    async fn keys(&self) -> HandoffResult<Vec<String>>;

    /// Delete a bucket. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> HandoffResult<bool>;
}

/// A single bucket: request key to response body
pub type Bucket = BTreeMap<String, Vec<u8>>;

/// In-process cache storage
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    buckets: RwLock<BTreeMap<String, Bucket>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the bucket if missing
    pub async fn open(&self, name: &str) {
        self.buckets
            .write()
            .await
            .entry(name.to_string())
            .or_default();
    }

    /// Store an entry, creating the bucket if needed
    pub async fn put(&self, bucket: &str, request: &str, response: impl Into<Vec<u8>>) {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default()
            .insert(request.to_string(), response.into());
    }

    /// Look up an entry
    pub async fn get(&self, bucket: &str, request: &str) -> Option<Vec<u8>> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .and_then(|b| b.get(request).cloned())
    }

    pub async fn len(&self) -> usize {
        self.buckets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.buckets.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn keys(&self) -> HandoffResult<Vec<String>> {
        Ok(self.buckets.read().await.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> HandoffResult<bool> {
        Ok(self.buckets.write().await.remove(name).is_some())
    }
}

/// Directory-backed storage: every subdirectory of `root` is a bucket
#[derive(Debug, Clone)]
pub struct DirCacheStorage {
    root: PathBuf,
}

impl DirCacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a bucket name to its directory, rejecting path traversal
    fn bucket_path(&self, name: &str) -> HandoffResult<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return Err(HandoffError::cache(format!("invalid bucket name {name:?}")));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl CacheStorage for DirCacheStorage {
    async fn keys(&self) -> HandoffResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Cache root {} missing, no buckets", self.root.display());
                return Ok(vec![]);
            }
            Err(e) => {
                return Err(HandoffError::cache(format!(
                    "listing {}: {e}",
                    self.root.display()
                )))
            }
        };

        let mut names = vec![];
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| HandoffError::cache(format!("reading cache entry: {e}")))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if is_dir {
                let name = entry.file_name().into_string().map_err(|raw| {
                    HandoffError::cache(format!(
                        "bucket name {:?} in {} is not valid UTF-8",
                        raw.to_string_lossy(),
                        self.root.display()
                    ))
                })?;
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> HandoffResult<bool> {
        let path = self.bucket_path(name)?;
        match fs::remove_dir_all(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(HandoffError::cache(format!(
                "deleting {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn memory_put_and_delete() {
        let storage = MemoryCacheStorage::new();
        storage.put("v1", "/index.html", "<html>").await;
        storage.open("v2").await;

        assert_eq!(storage.keys().await.unwrap(), vec!["v1", "v2"]);
        assert_eq!(
            storage.get("v1", "/index.html").await,
            Some(b"<html>".to_vec())
        );

        assert!(storage.delete("v1").await.unwrap());
        assert!(!storage.delete("v1").await.unwrap());
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn dir_keys_lists_only_directories() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("assets-v3")).unwrap();
        std::fs::create_dir(temp.path().join("api-v1")).unwrap();
        std::fs::write(temp.path().join("stray.txt"), "x").unwrap();

        let storage = DirCacheStorage::new(temp.path());
        assert_eq!(storage.keys().await.unwrap(), vec!["api-v1", "assets-v3"]);
    }

    #[tokio::test]
    async fn dir_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let storage = DirCacheStorage::new(temp.path().join("absent"));
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dir_delete_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let bucket = temp.path().join("v1");
        std::fs::create_dir_all(bucket.join("nested")).unwrap();
        std::fs::write(bucket.join("nested").join("entry"), "body").unwrap();

        let storage = DirCacheStorage::new(temp.path());
        assert!(storage.delete("v1").await.unwrap());
        assert!(!bucket.exists());
        assert!(!storage.delete("v1").await.unwrap());
    }

    #[tokio::test]
    async fn dir_non_utf8_bucket_is_reported() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(OsStr::from_bytes(b"v\xff1"))).unwrap();
        std::fs::create_dir(temp.path().join("ok")).unwrap();

        let storage = DirCacheStorage::new(temp.path());
        let err = storage.keys().await.unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[tokio::test]
    async fn dir_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let storage = DirCacheStorage::new(temp.path());
        assert!(storage.delete("..").await.is_err());
        assert!(storage.delete("a/b").await.is_err());
    }
}
