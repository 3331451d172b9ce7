//! HTTP response building module
//!
//! Builders for the fixed status responses the pipeline produces, decoupled
//! from specific interceptor logic.

use hyper::{Response, StatusCode};

use super::body::{self, Body};

/// Build 200 OK with an empty body (health check)
pub fn health_ok() -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .body(body::empty())
        .unwrap_or_else(|_| Response::new(body::empty()))
}

/// Build 404 Not Found response
pub fn not_found(message: &str) -> Response<Body> {
    plain(StatusCode::NOT_FOUND, message)
}

/// Build 500 Internal Server Error response
pub fn internal_error(message: &str) -> Response<Body> {
    plain(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Build a redirect response pointing at `location`
pub fn redirect(status: StatusCode, location: &str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Location", location)
        .header("Content-Type", "text/plain")
        .body(body::full("Redirecting..."))
        .unwrap_or_else(|_| plain(StatusCode::INTERNAL_SERVER_ERROR, "invalid redirect target"))
}

/// Build a plain-text response with the given status
pub fn plain(status: StatusCode, message: &str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(body::full(message.to_string()))
        // A fixed status line and header cannot fail to build
        .unwrap_or_else(|_| Response::new(body::empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_health_ok_empty_body() {
        let resp = health_ok();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_redirect_sets_location() {
        let resp = redirect(StatusCode::MOVED_PERMANENTLY, "https://cdn/x.png");
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()["Location"], "https://cdn/x.png");
    }

    #[tokio::test]
    async fn test_not_found_carries_message() {
        let resp = not_found("file not found");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.as_ref(), b"file not found");
    }
}
