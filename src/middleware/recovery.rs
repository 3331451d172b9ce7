//! Panic recovery middleware
//!
//! Converts any panic raised below it into a clean 500 response with the
//! panic description and a captured backtrace in the body. No fault crosses
//! this layer: the process keeps serving and the connection gets a response.

use std::any::Any;
use std::backtrace::Backtrace;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use hyper::Response;

use crate::http::{response, Body};
use crate::logger::NamedLogger;

/// Wraps the downstream call in a per-request guarded scope
pub struct Recovery {
    log: NamedLogger,
}

impl Recovery {
    pub fn new(log: NamedLogger) -> Self {
        Self { log }
    }

    /// Run `downstream`; on panic, respond 500 instead of unwinding
    ///
    /// In this model a response is only written once the handler returns, so
    /// a recovered panic never races an already-committed status line. A
    /// panic inside an in-flight streaming body belongs to the transport,
    /// which surfaces it as a broken stream.
    pub async fn guard<F>(&self, downstream: F) -> Response<Body>
    where
        F: Future<Output = Response<Body>>,
    {
        match AssertUnwindSafe(downstream).catch_unwind().await {
            Ok(resp) => resp,
            Err(panic) => {
                let combined = format!(
                    "PANIC: {}\n{}",
                    panic_message(panic.as_ref()),
                    Backtrace::force_capture()
                );
                self.log.error(&combined);
                response::internal_error(&combined)
            }
        }
    }
}

/// Best-effort extraction of the panic payload's message
fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{Level, Logger};
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use std::sync::Arc;

    fn recovery() -> Recovery {
        let logger = Arc::new(Logger::stdio(Level::None));
        Recovery::new(logger.named("router"))
    }

    #[tokio::test]
    async fn test_normal_return_untouched() {
        let resp = recovery()
            .guard(async { response::plain(StatusCode::OK, "fine") })
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_str_panic_becomes_500() {
        let resp = recovery()
            .guard(async { panic!("handler exploded") })
            .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&bytes).to_string();
        assert!(text.starts_with("PANIC: handler exploded"));
    }

    #[tokio::test]
    async fn test_string_panic_becomes_500() {
        let resp = recovery()
            .guard(async { std::panic::panic_any(format!("id {} missing", 7)) })
            .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&bytes).contains("id 7 missing"));
    }

    #[tokio::test]
    async fn test_opaque_payload_still_recovers() {
        let resp = recovery().guard(async { std::panic::panic_any(42_u32) }).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&bytes).contains("unknown panic payload"));
    }
}
