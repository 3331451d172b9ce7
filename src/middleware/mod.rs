//! Cross-cutting middleware module
//!
//! Each middleware is an explicit value constructed once at startup from the
//! configuration and an injected logger handle; the router composes them in
//! a fixed order. None of them spawns background work; each is a synchronous
//! wrapper around the downstream call on the request's own task.

pub mod access_log;
pub mod recovery;
pub mod request_log;
pub mod storage;

pub use access_log::{AccessLogger, Identity};
pub use recovery::Recovery;
pub use request_log::RequestLogger;
pub use storage::{ServeMode, StorageBinding};
