//! Static asset interceptor
//!
//! Serves files from a configured directory at the URL root for GET/HEAD
//! requests. A request that does not resolve to a file inside the root is
//! passed through untouched; the fallback router decides what a miss means.

use std::path::{Path, PathBuf};

use hyper::{Method, Response, StatusCode};

use crate::http::{body, mime, Body};
use crate::logger::NamedLogger;

pub struct StaticFiles {
    root: PathBuf,
    log: NamedLogger,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, log: NamedLogger) -> Self {
        Self {
            root: root.into(),
            log,
        }
    }

    /// Claim the request or pass it through (`None` touches nothing)
    pub async fn intercept(&self, method: &Method, path: &str) -> Option<Response<Body>> {
        if *method != Method::GET && *method != Method::HEAD {
            return None;
        }
        let (content, content_type) = self.load(path).await?;
        let resp = Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", content_type)
            .header("Content-Length", content.len())
            .body(body::full(content))
            .unwrap_or_else(|_| Response::new(body::empty()));
        Some(resp)
    }

    /// Load a file under the root, guarding against path traversal
    async fn load(&self, path: &str) -> Option<(Vec<u8>, &'static str)> {
        // Remove leading slash and prevent directory traversal
        let clean_path = path.trim_start_matches('/').replace("..", "");
        if clean_path.is_empty() {
            return None;
        }
        let file_path = self.root.join(&clean_path);

        let root_canonical = match self.root.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                self.log.warn(&format!(
                    "Static directory not found or inaccessible '{}': {e}",
                    self.root.display()
                ));
                return None;
            }
        };

        // File not found is common, not worth a warning
        let file_canonical = file_path.canonicalize().ok()?;
        if !file_canonical.starts_with(&root_canonical) || !file_canonical.is_file() {
            self.log.warn(&format!(
                "Static path rejected: {path} -> {}",
                file_canonical.display()
            ));
            return None;
        }

        let content = match tokio::fs::read(&file_canonical).await {
            Ok(c) => c,
            Err(e) => {
                self.log.error(&format!(
                    "Failed to read file '{}': {e}",
                    file_canonical.display()
                ));
                return None;
            }
        };

        let content_type =
            mime::get_content_type(file_canonical.extension().and_then(|e| e.to_str()));
        Some((content, content_type))
    }
}

/// Serve `robots.txt` from `dir`, 404 when the file is missing
pub async fn serve_robots(dir: &Path, log: &NamedLogger) -> Response<Body> {
    let path = dir.join("robots.txt");
    match tokio::fs::read(&path).await {
        Ok(content) => Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body::full(content))
            .unwrap_or_else(|_| Response::new(body::empty())),
        Err(e) => {
            log.warn(&format!(
                "robots.txt enabled but unreadable at '{}': {e}",
                path.display()
            ));
            crate::http::response::not_found("404 Not Found")
        }
    }
}
