//! Front-dispatch HTTP pipeline.
//!
//! Portico sits in front of a full-featured application router and owns the
//! request path up to the point where the application takes over:
//!
//! - cross-cutting middleware (request logging, panic recovery, access
//!   logging) applied to every inbound request;
//! - fast-path interception of health checks, static assets, `robots.txt`
//!   and object-storage-backed files (avatars and the like);
//! - transparent forwarding of everything else, including "route not found"
//!   and "method not allowed", to a fallback router supplied by the host
//!   process.
//!
//! The two-router seam is invisible to clients: there is a single dispatch
//! entry point ([`router::FastRouter::dispatch`]) and a single fallback
//! handler that owns all 404/405 semantics.

pub mod config;
pub mod http;
pub mod logger;
pub mod middleware;
pub mod router;
pub mod server;
pub mod storage;

pub use config::RouterConfig;
pub use logger::{Level, Logger};
pub use middleware::access_log::Identity;
pub use middleware::storage::{ServeMode, StorageBinding};
pub use router::{Fallback, FastRouter};
pub use storage::{ObjectStore, StorageError};
