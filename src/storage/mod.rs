//! Object storage seam
//!
//! The pipeline consumes object stores through [`ObjectStore`]: open a read
//! stream for a key, or ask for a time-limited URL a client can fetch
//! directly. Errors distinguish exactly what the HTTP layer needs: "not
//! found" (becomes 404) versus everything else (becomes 500).
//!
//! Two implementations ship with the crate: [`LocalStore`] for
//! filesystem-backed stores without addressable URLs, and [`MemoryStore`]
//! for embedding and tests.

pub mod local;
pub mod memory;

use futures_util::future::BoxFuture;
use tokio::io::AsyncRead;

pub use local::LocalStore;
pub use memory::MemoryStore;

/// Readable object stream handed out by a store
pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;

/// Storage access failure
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Backend(String),
}

impl StorageError {
    /// Whether this failure maps to a client 404 rather than a server 500
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            Self::Backend(_) => false,
        }
    }
}

/// Async object storage contract
///
/// Implementations own their concurrency safety; the pipeline calls `open`
/// and `url` concurrently from many requests without locking.
pub trait ObjectStore: Send + Sync + 'static {
    /// Open a read stream for `key`
    fn open(&self, key: &str) -> BoxFuture<'_, Result<ObjectReader, StorageError>>;

    /// Time-limited URL for `key`, suitable for a client redirect
    ///
    /// `display_name` is a hint for stores that embed a download filename in
    /// the signed URL. Stores without addressable URLs return
    /// [`StorageError::Backend`].
    fn url(&self, key: &str, display_name: &str) -> BoxFuture<'_, Result<String, StorageError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(StorageError::NotFound("k".into()).is_not_found());
        assert!(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone"
        ))
        .is_not_found());
        assert!(!StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied"
        ))
        .is_not_found());
        assert!(!StorageError::Backend("no signing".into()).is_not_found());
    }
}
