//! Local filesystem object store
//!
//! Objects are flat files under a root directory; the object key is used as
//! a relative path. Local storage has no addressable URLs, so bindings over
//! this store must proxy bytes (`serve_direct = false`).

use std::path::PathBuf;

use futures_util::future::BoxFuture;

use super::{ObjectReader, ObjectStore, StorageError};

/// Stores objects on the local filesystem
pub struct LocalStore {
    /// Root directory for all stored objects
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Resolve a key to a path, rejecting traversal out of the root
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        for component in std::path::Path::new(key).components() {
            if matches!(component, std::path::Component::ParentDir) {
                return Err(StorageError::Backend(format!(
                    "path traversal in storage key: {key}"
                )));
            }
        }
        Ok(self.root.join(key))
    }
}

impl ObjectStore for LocalStore {
    fn open(&self, key: &str) -> BoxFuture<'_, Result<ObjectReader, StorageError>> {
        let key = key.to_string();
        Box::pin(async move {
            let path = self.resolve(&key)?;
            let file = tokio::fs::File::open(&path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StorageError::NotFound(key.clone())
                } else {
                    StorageError::Io(e)
                }
            })?;
            Ok(Box::new(file) as ObjectReader)
        })
    }

    fn url(&self, _key: &str, _display_name: &str) -> BoxFuture<'_, Result<String, StorageError>> {
        Box::pin(async {
            Err(StorageError::Backend(
                "local storage does not provide signed URLs".to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_open_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("avatar1.png"), b"png bytes").unwrap();

        let store = LocalStore::new(dir.path()).unwrap();
        let mut reader = store.open("avatar1.png").await.unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"png bytes");
    }

    #[tokio::test]
    async fn test_open_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        let err = store.open("missing.png").await.err().unwrap();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        let err = store.open("../outside").await.err().unwrap();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_url_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        let err = store.url("avatar1.png", "avatar1.png").await.unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));
    }
}
