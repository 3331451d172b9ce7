//! Object-storage serving middleware
//!
//! A binding ties a URL path prefix to an object store and a serving mode,
//! all fixed at startup. For GET/HEAD requests under its prefix the binding
//! either streams the object through this process or hands the client a
//! time-limited URL signed by the store. Everything else passes through
//! untouched: no response bytes written, no request body consumed.

use std::sync::Arc;

use hyper::{Method, Response, StatusCode};

use crate::config::StorageConfig;
use crate::http::{body, response, Body};
use crate::logger::{Logger, NamedLogger};
use crate::storage::ObjectStore;

/// How a binding answers requests for its objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// Stream bytes from the store through this process. Used when the
    /// store has no addressable URLs (local filesystem and the like).
    DirectProxy,
    /// 301 to a time-limited URL signed by the store, offloading bandwidth
    /// to the backing storage.
    RedirectToSignedUrl,
}

impl ServeMode {
    /// Chosen once from configuration at binding-construction time
    pub fn from_config(cfg: &StorageConfig) -> Self {
        if cfg.serve_direct {
            Self::RedirectToSignedUrl
        } else {
            Self::DirectProxy
        }
    }
}

/// One (prefix, serving mode, object store) route binding
pub struct StorageBinding {
    prefix: String,
    mode: ServeMode,
    store: Arc<dyn ObjectStore>,
    log: NamedLogger,
}

impl StorageBinding {
    pub fn new(
        prefix: impl Into<String>,
        cfg: &StorageConfig,
        store: Arc<dyn ObjectStore>,
        logger: &Arc<Logger>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            mode: ServeMode::from_config(cfg),
            store,
            log: logger.named("router"),
        }
    }

    pub fn mode(&self) -> ServeMode {
        self.mode
    }

    /// Object key for `path`, or `None` when the path is outside the prefix
    ///
    /// `/avatars/a.png` matches prefix `avatars` with key `a.png`;
    /// `/avatarsx` does not match. The leading slash is stripped so keys are
    /// store-relative in both modes.
    fn key_for<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix('/')?.strip_prefix(self.prefix.as_str())?;
        match rest.strip_prefix('/') {
            Some(key) => Some(key),
            None if rest.is_empty() => Some(""),
            None => None,
        }
    }

    /// Claim the request or pass it through
    ///
    /// `None` means the binding did not touch the request in any way.
    pub async fn intercept(&self, method: &Method, path: &str) -> Option<Response<Body>> {
        if *method != Method::GET && *method != Method::HEAD {
            return None;
        }
        let key = self.key_for(path)?;

        let resp = match self.mode {
            ServeMode::RedirectToSignedUrl => self.redirect_to_store(key).await,
            ServeMode::DirectProxy => self.proxy_from_store(key, *method == Method::HEAD).await,
        };
        Some(resp)
    }

    async fn redirect_to_store(&self, key: &str) -> Response<Body> {
        let display_name = key.rsplit('/').next().unwrap_or(key);
        match self.store.url(key, display_name).await {
            Ok(url) => response::redirect(StatusCode::MOVED_PERMANENTLY, &url),
            Err(e) if e.is_not_found() => {
                self.log
                    .warn(&format!("Unable to find {} {key}", self.prefix));
                response::not_found("file not found")
            }
            Err(e) => {
                self.log.error(&format!(
                    "Error whilst getting URL for {} {key}. Error: {e}",
                    self.prefix
                ));
                // The store's own detail stays in the log
                response::internal_error(&format!(
                    "Error whilst getting URL for {} {key}",
                    self.prefix
                ))
            }
        }
    }

    async fn proxy_from_store(&self, key: &str, is_head: bool) -> Response<Body> {
        match self.store.open(key).await {
            // HEAD still opens the object so missing keys answer 404, but
            // the response body stays empty
            Ok(reader) => Response::builder()
                .status(StatusCode::OK)
                .body(if is_head {
                    body::empty()
                } else {
                    body::stream(reader)
                })
                .unwrap_or_else(|_| response::internal_error("response build failed")),
            Err(e) if e.is_not_found() => {
                self.log
                    .warn(&format!("Unable to find {} {key}", self.prefix));
                response::not_found("file not found")
            }
            Err(e) => {
                self.log.error(&format!(
                    "Error whilst opening {} {key}. Error: {e}",
                    self.prefix
                ));
                response::internal_error(&format!(
                    "Error whilst opening {} {key}",
                    self.prefix
                ))
            }
        }
    }
}
