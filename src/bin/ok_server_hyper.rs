//! A catch-all HTTP server that answers `200 OK` to every request.
//!
//! Each accepted connection is served on its own task. The listening port is
//! the first command line argument, defaulting to 8080.

use std::convert::Infallible;
use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use log::{debug, info};
use tokio::net::TcpListener;

fn port_from_args(mut args: impl Iterator<Item = String>) -> u16 {
    args.nth(1).and_then(|s| s.parse().ok()).unwrap_or(8080)
}

async fn handle<B>(_req: Request<B>) -> Result<Response<Full<Bytes>>, Infallible> {
    let mut response = Response::new(Full::new(Bytes::from_static(b"OK")));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let port = port_from_args(std::env::args());
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {addr}");

    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new()
                .serve_connection(io, service_fn(|req: Request<Incoming>| handle(req)))
                .await
            {
                debug!("Connection from {peer} ended with error: {e}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use hyper::{Request, StatusCode};

    use super::{handle, port_from_args};

    fn args(extra: &[&str]) -> impl Iterator<Item = String> {
        std::iter::once("ok-server-hyper".to_string())
            .chain(extra.iter().map(|s| s.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_default_port() {
        assert_eq!(port_from_args(args(&[])), 8080);
    }

    #[test]
    fn test_explicit_port() {
        assert_eq!(port_from_args(args(&["9000"])), 9000);
    }

    #[test]
    fn test_non_numeric_port_falls_back() {
        assert_eq!(port_from_args(args(&["not-a-port"])), 8080);
    }

    #[tokio::test]
    async fn test_handle_answers_ok_for_any_request() {
        for request in [
            Request::new(()),
            Request::builder()
                .method("DELETE")
                .uri("/any/path")
                .body(())
                .unwrap(),
        ] {
            let response = handle(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()["Content-Type"], "text/plain");
            let body = response.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(&body[..], b"OK");
        }
    }
}
