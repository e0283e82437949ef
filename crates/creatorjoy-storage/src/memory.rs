//! In-memory storage backend.
//!
//! Keeps every document in a `BTreeMap` behind a `RwLock`. Nothing survives a
//! restart, which makes it the default for local development of the dashboard
//! and the backend every unit test runs against.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{StorageBackend, StorageError};

/// An in-memory storage backend backed by a `BTreeMap`.
///
/// Cloning is cheap and clones share the same map, so a server and its tests
/// can observe the same collections.
///
/// # Examples
///
/// ```
/// # use creatorjoy_storage::{MemoryBackend, StorageBackend};
/// # #[tokio::main]
/// # async fn main() {
/// let backend = MemoryBackend::new();
/// backend.put("styles/abc", b"{}").await.unwrap();
/// assert_eq!(backend.count("styles/").await.unwrap(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn prefixed<'a>(
        data: &'a BTreeMap<String, Vec<u8>>,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Vec<u8>)> + 'a {
        data.range(prefix.to_owned()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.data
            .write()
            .await
            .insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.data.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let data = self.data.read().await;
        Ok(Self::prefixed(&data, prefix).map(|(k, _)| k.clone()).collect())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
        let data = self.data.read().await;
        Ok(Self::prefixed(&data, prefix)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn count(&self, prefix: &str) -> Result<usize, StorageError> {
        let data = self.data.read().await;
        Ok(Self::prefixed(&data, prefix).count())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.data.read().await.contains_key(key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_missing_document_returns_none() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("styles/missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_overwrites_existing_document() {
        let backend = MemoryBackend::new();
        backend.put("styles/a", b"v1").await.unwrap();
        backend.put("styles/a", b"v2").await.unwrap();
        assert_eq!(backend.get("styles/a").await.unwrap(), Some(b"v2".to_vec()));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let backend = MemoryBackend::new();
        backend.put("styles/a", b"{}").await.unwrap();
        backend.delete("styles/a").await.unwrap();
        backend.delete("styles/a").await.unwrap();
        assert!(!backend.exists("styles/a").await.unwrap());
    }

    #[tokio::test]
    async fn collections_do_not_leak_into_each_other() {
        let backend = MemoryBackend::new();
        backend.put("styles/a", b"1").await.unwrap();
        backend.put("styles/b", b"2").await.unwrap();
        backend.put("history/a", b"3").await.unwrap();

        assert_eq!(
            backend.list("styles/").await.unwrap(),
            vec!["styles/a", "styles/b"]
        );
        assert_eq!(backend.count("history/").await.unwrap(), 1);
        assert_eq!(backend.count("nothing/").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn scan_returns_keys_with_values() {
        let backend = MemoryBackend::new();
        backend.put("history/x", b"one").await.unwrap();
        backend.put("history/y", b"two").await.unwrap();
        backend.put("styles/z", b"three").await.unwrap();

        let entries = backend.scan("history/").await.unwrap();
        assert_eq!(
            entries,
            vec![
                ("history/x".to_owned(), b"one".to_vec()),
                ("history/y".to_owned(), b"two".to_vec()),
            ]
        );
    }

    #[tokio::test]
    async fn clones_share_state() {
        let backend = MemoryBackend::new();
        let clone = backend.clone();
        backend.put("styles/a", b"{}").await.unwrap();
        assert!(clone.exists("styles/a").await.unwrap());
    }
}
