//! HTTP protocol layer module
//!
//! Body type, response builders and MIME detection shared by the
//! interceptors and the middleware chain, decoupled from routing logic.

pub mod body;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use body::{empty, full, stream, Body, BoxError};
