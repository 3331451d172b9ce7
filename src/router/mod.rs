//! Fast router and fallback bridge
//!
//! The single dispatch entry point for every inbound request. A fixed
//! middleware chain (request logging, panic recovery, access logging) wraps
//! an ordered list of interceptors (health check, robots.txt, static files,
//! storage bindings). An interceptor may claim a request outright. Anything
//! unclaimed is forwarded to one fallback handler, including what a classic
//! router would call "not found" or "method not allowed", so clients only
//! ever see one router.

pub mod static_files;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::BoxFuture;
use hyper::{Method, Request, Response};

use crate::config::RouterConfig;
use crate::http::{response, Body};
use crate::logger::Logger;
use crate::middleware::{AccessLogger, Recovery, RequestLogger, StorageBinding};
use crate::storage::ObjectStore;

pub use static_files::StaticFiles;

/// The full-feature router invoked when no interceptor claims a request
///
/// This is the whole seam: the fallback owns routing-table matching and all
/// 404/405 semantics. Every unmatched request reaches the same instance.
pub trait Fallback: Send + Sync + 'static {
    fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response<Body>>;
}

impl<F, Fut> Fallback for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Response<Body>> + Send + 'static,
{
    fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response<Body>> {
        Box::pin(self(req))
    }
}

/// Lightweight interception router in front of the fallback
pub struct FastRouter {
    request_log: Option<RequestLogger>,
    recovery: Recovery,
    access_log: Option<AccessLogger>,
    static_files: Option<StaticFiles>,
    robots_dir: Option<PathBuf>,
    bindings: Vec<StorageBinding>,
    fallback: Arc<dyn Fallback>,
    logger: Arc<Logger>,
}

impl FastRouter {
    /// Compose the middleware chain from startup configuration
    ///
    /// All install decisions happen here, once; `dispatch` only follows
    /// what was wired.
    pub fn new(cfg: &RouterConfig, logger: Arc<Logger>, fallback: impl Fallback) -> Self {
        let router_log = logger.named("router");
        Self {
            request_log: RequestLogger::from_config(&cfg.router_log, &logger),
            recovery: Recovery::new(router_log.clone()),
            access_log: AccessLogger::from_config(&cfg.access_log, &logger, &router_log),
            static_files: cfg
                .static_files
                .enabled
                .then(|| StaticFiles::new(&cfg.static_files.root, router_log)),
            robots_dir: cfg
                .robots_txt
                .enabled
                .then(|| PathBuf::from(&cfg.robots_txt.dir)),
            bindings: Vec::new(),
            fallback: Arc::new(fallback),
            logger,
        }
    }

    /// Register a storage binding; bindings are checked in registration
    /// order and never change after startup
    #[must_use]
    pub fn bind_storage(
        mut self,
        prefix: impl Into<String>,
        cfg: &crate::config::StorageConfig,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        self.bindings
            .push(StorageBinding::new(prefix, cfg, store, &self.logger));
        self
    }

    /// Dispatch one request through the whole pipeline
    pub async fn dispatch(&self, req: Request<Body>, remote_addr: SocketAddr) -> Response<Body> {
        let started = Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();

        if let Some(rl) = &self.request_log {
            rl.started(&method, &uri, &remote_addr);
        }

        let resp = self
            .recovery
            .guard(self.logged_route(req, remote_addr, started))
            .await;

        if let Some(rl) = &self.request_log {
            rl.completed(&method, &uri, resp.status(), started.elapsed());
        }
        resp
    }

    /// Access logging wraps interception; the snapshot is captured before
    /// downstream may consume the request and completed afterwards
    async fn logged_route(
        &self,
        req: Request<Body>,
        remote_addr: SocketAddr,
        started: Instant,
    ) -> Response<Body> {
        let snapshot = self
            .access_log
            .as_ref()
            .map(|al| al.snapshot(&req, remote_addr));

        let resp = self.route(req).await;

        if let (Some(al), Some(snap)) = (&self.access_log, snapshot) {
            al.emit(snap, &resp, started.elapsed());
        }
        resp
    }

    /// The intercept-or-forward state machine
    ///
    /// Each request starts unmatched; the first interceptor to claim it
    /// terminates dispatch. Interceptors that decline must not have read the
    /// body or written anything.
    async fn route(&self, req: Request<Body>) -> Response<Body> {
        let method = req.method();
        let path = req.uri().path();

        // Health check, intercepted unconditionally
        if *method == Method::HEAD && path == "/" {
            return response::health_ok();
        }

        if let Some(dir) = &self.robots_dir {
            if *method == Method::GET && path == "/robots.txt" {
                return static_files::serve_robots(dir, &self.logger.named("router")).await;
            }
        }

        if let Some(st) = &self.static_files {
            if let Some(resp) = st.intercept(method, path).await {
                return resp;
            }
        }

        for binding in &self.bindings {
            if let Some(resp) = binding.intercept(method, path).await {
                return resp;
            }
        }

        // Unmatched: the fallback owns everything from here, including
        // not-found and method-not-allowed
        self.fallback.call(req).await
    }
}
