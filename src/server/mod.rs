//! Serving glue
//!
//! The pipeline is normally mounted inside a larger process; this module is
//! the minimal stand-alone mounting: a reusable TCP listener and an accept
//! loop that drives every connection through [`FastRouter::dispatch`].
//! Scheduling is task-per-connection; the pipeline itself spawns nothing.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

use crate::http::BoxError;
use crate::logger::Logger;
use crate::router::FastRouter;

/// Create a `TcpListener` with `SO_REUSEPORT` and `SO_REUSEADDR` enabled
///
/// Lets a replacement process bind the same address before the old one is
/// gone, so the host can restart without dropping the port.
pub fn create_reusable_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_port(true)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

/// Accept connections forever, dispatching each request through the router
pub async fn serve(
    listener: TcpListener,
    router: Arc<FastRouter>,
    logger: Arc<Logger>,
) -> std::io::Result<()> {
    let log = logger.named("router");
    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                log.error(&format!("Failed to accept connection: {e}"));
                continue;
            }
        };

        let router = Arc::clone(&router);
        let conn_log = log.clone();
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| {
                let router = Arc::clone(&router);
                async move {
                    // Erase the incoming body so the pipeline sees its one
                    // body type end to end
                    let req =
                        req.map(|b: hyper::body::Incoming| b.map_err(BoxError::from).boxed_unsync());
                    Ok::<_, Infallible>(router.dispatch(req, peer_addr).await)
                }
            });

            let conn = http1::Builder::new()
                .keep_alive(true)
                .serve_connection(io, service);
            if let Err(e) = conn.await {
                conn_log.error(&format!("Failed to serve connection: {e:?}"));
            }
        });
    }
}
