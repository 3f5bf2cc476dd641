//! A catch-all HTTP server that answers `200 OK` to every request.
//!
//! All connections are served by a single worker thread. The listening port
//! is the first command line argument, defaulting to 8080.

use std::error::Error;

use log::info;
use touche::{Body, Request, Response, Server, StatusCode};

fn port_from_args(mut args: impl Iterator<Item = String>) -> u16 {
    args.nth(1).and_then(|s| s.parse().ok()).unwrap_or(8080)
}

fn handle(_req: Request<Body>) -> Result<Response<&'static str>, Box<dyn Error + Send + Sync>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain")
        .body("OK")
        .map_err(Into::into)
}

fn main() -> std::io::Result<()> {
    env_logger::init();

    let port = port_from_args(std::env::args());
    info!("Listening on 0.0.0.0:{port}");

    Server::builder()
        .max_threads(1)
        .try_bind(("0.0.0.0", port))?
        .serve(handle)
}

#[cfg(test)]
mod tests {
    use touche::{Body, Request, StatusCode};

    use super::{handle, port_from_args};

    fn args(extra: &[&str]) -> impl Iterator<Item = String> {
        std::iter::once("ok-server-touche".to_string())
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
        assert_eq!(port_from_args(args(&["3000"])), 3000);
    }

    #[test]
    fn test_non_numeric_port_falls_back() {
        assert_eq!(port_from_args(args(&["abc"])), 8080);
    }

    #[test]
    fn test_handle_answers_ok_for_any_request() {
        for request in [
            Request::new(Body::empty()),
            Request::builder()
                .method("DELETE")
                .uri("/any/path")
                .body(Body::empty())
                .unwrap(),
        ] {
            let response = handle(request).unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()["Content-Type"], "text/plain");
            assert_eq!(*response.body(), "OK");
        }
    }
}
