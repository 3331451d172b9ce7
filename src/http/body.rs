//! Response body module
//!
//! Every handler in the pipeline speaks one erased body type so that buffered
//! responses, empty responses and streamed object-store reads compose behind
//! a single `Response<Body>`.

use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// Erased error type carried by [`Body`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Erased response/request body used throughout the pipeline
pub type Body = UnsyncBoxBody<Bytes, BoxError>;

/// Buffered body from any byte source
pub fn full(data: impl Into<Bytes>) -> Body {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Empty body
pub fn empty() -> Body {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Streaming body over an async reader
///
/// The reader is owned by the body, so it is dropped on every exit path:
/// normal completion, mid-stream I/O error, or the client going away.
pub fn stream(reader: impl AsyncRead + Send + Unpin + 'static) -> Body {
    let frames = ReaderStream::new(reader)
        .map_ok(Frame::data)
        .map_err(|e| Box::new(e) as BoxError);
    StreamBody::new(frames).boxed_unsync()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_full_roundtrip() {
        let body = full("hello");
        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected, Bytes::from("hello"));
    }

    #[tokio::test]
    async fn test_empty_is_empty() {
        let body = empty();
        let collected = body.collect().await.unwrap().to_bytes();
        assert!(collected.is_empty());
    }

    #[tokio::test]
    async fn test_stream_reads_everything() {
        let reader = std::io::Cursor::new(b"streamed bytes".to_vec());
        let body = stream(reader);
        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected, Bytes::from("streamed bytes"));
    }
}
