//! In-memory object store
//!
//! Objects live in a `HashMap` behind an async read-write lock. Useful for
//! embedding and for exercising both serving modes in tests: an optional URL
//! base makes `url()` answer like a store with native URL signing.

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use hyper::body::Bytes;
use tokio::sync::RwLock;

use super::{ObjectReader, ObjectStore, StorageError};

/// In-memory object store
pub struct MemoryStore {
    objects: RwLock<HashMap<String, Bytes>>,
    /// When set, `url()` returns `<base>/<key>`; when unset the store
    /// behaves like one without addressable URLs.
    url_base: Option<String>,
}

impl MemoryStore {
    /// Empty store without URL signing
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            url_base: None,
        }
    }

    /// Empty store that signs URLs under `base` (no trailing slash)
    pub fn with_url_base(base: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            url_base: Some(base.into()),
        }
    }

    /// Insert or replace an object
    pub async fn put(&self, key: impl Into<String>, data: impl Into<Bytes>) {
        self.objects.write().await.insert(key.into(), data.into());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for MemoryStore {
    fn open(&self, key: &str) -> BoxFuture<'_, Result<ObjectReader, StorageError>> {
        let key = key.to_string();
        Box::pin(async move {
            let objects = self.objects.read().await;
            match objects.get(&key) {
                Some(data) => Ok(Box::new(std::io::Cursor::new(data.clone())) as ObjectReader),
                None => Err(StorageError::NotFound(key)),
            }
        })
    }

    fn url(&self, key: &str, _display_name: &str) -> BoxFuture<'_, Result<String, StorageError>> {
        let key = key.to_string();
        Box::pin(async move {
            let Some(base) = &self.url_base else {
                return Err(StorageError::Backend(
                    "memory storage has no URL base configured".to_string(),
                ));
            };
            let objects = self.objects.read().await;
            if objects.contains_key(&key) {
                Ok(format!("{base}/{key}"))
            } else {
                Err(StorageError::NotFound(key))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_put_then_open() {
        let store = MemoryStore::new();
        store.put("avatar1.png", &b"stored bytes"[..]).await;

        let mut reader = store.open("avatar1.png").await.unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"stored bytes");
    }

    #[tokio::test]
    async fn test_open_missing() {
        let store = MemoryStore::new();
        assert!(store.open("nope").await.err().unwrap().is_not_found());
    }

    #[tokio::test]
    async fn test_url_with_base() {
        let store = MemoryStore::with_url_base("https://cdn");
        store.put("avatar1.png", &b"x"[..]).await;
        let url = store.url("avatar1.png", "avatar1.png").await.unwrap();
        assert_eq!(url, "https://cdn/avatar1.png");
    }

    #[tokio::test]
    async fn test_url_without_base_is_backend_error() {
        let store = MemoryStore::new();
        store.put("k", &b"x"[..]).await;
        let err = store.url("k", "k").await.unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));
    }
}
