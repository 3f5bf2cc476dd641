//! Tests for the probe runner.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::cases::{Case, Category, Expectation, Step, Verdict};
    use crate::runner::{RunOptions, Runner};

    /// A loopback server that answers every request with the same canned
    /// response, then closes.
    async fn canned_server(response: &'static [u8]) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket.write_all(response).await;
                });
            }
        });
        port
    }

    fn options(port: u16) -> RunOptions {
        RunOptions {
            host: "127.0.0.1".to_string(),
            port,
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_millis(500),
            ..RunOptions::default()
        }
    }

    fn get_case(id: &'static str, expected: Expectation) -> Case {
        Case::single(
            id,
            "plain GET",
            Category::Compliance,
            |t| format!("GET / HTTP/1.1\r\nHost: {}\r\n\r\n", t.host_header()).into_bytes(),
            expected,
        )
    }

    #[tokio::test]
    async fn test_single_case_passes_against_ok_server() {
        let port = canned_server(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nOK").await;
        let runner = Runner::new(options(port));

        let report = runner
            .run(vec![get_case("T-OK", Expectation::success())], |_| {})
            .await;

        assert_eq!(report.total(), 1);
        assert_eq!(report.passed(), 1);
        let result = &report.results[0];
        assert_eq!(result.verdict, Verdict::Pass);
        assert_eq!(result.status_code, Some(200));
        assert!(result.raw_request.contains("GET / HTTP/1.1"));
        assert!(result.raw_response.contains("200 OK"));
    }

    #[tokio::test]
    async fn test_single_case_fails_on_wrong_status() {
        let port = canned_server(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").await;
        let runner = Runner::new(options(port));

        let report = runner
            .run(vec![get_case("T-WRONG", Expectation::status(400))], |_| {})
            .await;

        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_becomes_error_verdict() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let runner = Runner::new(options(port));
        let report = runner
            .run(vec![get_case("T-REFUSED", Expectation::success())], |_| {})
            .await;

        assert_eq!(report.errors(), 1);
        assert!(report.results[0].error.is_some());
    }

    #[tokio::test]
    async fn test_category_filter_skips() {
        let port = canned_server(b"HTTP/1.1 200 OK\r\n\r\n").await;
        let mut opts = options(port);
        opts.category = Some(Category::Smuggling);
        let runner = Runner::new(opts);

        let report = runner
            .run(vec![get_case("T-FILTERED", Expectation::success())], |_| {})
            .await;

        assert_eq!(report.skipped(), 1);
        assert_eq!(report.scored(), 0);
        assert_eq!(report.results[0].verdict, Verdict::Skip);
    }

    #[tokio::test]
    async fn test_id_filter_is_case_insensitive() {
        let port = canned_server(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").await;
        let mut opts = options(port);
        opts.ids = vec!["t-wanted".to_string()];
        let runner = Runner::new(opts);

        let cases = vec![
            get_case("T-WANTED", Expectation::success()),
            get_case("T-OTHER", Expectation::success()),
        ];
        let report = runner.run(cases, |_| {}).await;

        assert_eq!(report.passed(), 1);
        assert_eq!(report.skipped(), 1);
    }

    #[tokio::test]
    async fn test_unscored_case_not_counted_in_score() {
        let port = canned_server(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").await;
        let runner = Runner::new(options(port));

        let report = runner
            .run(
                vec![get_case("T-INFO", Expectation::success()).unscored()],
                |_| {},
            )
            .await;

        assert_eq!(report.scored(), 0);
        assert_eq!(report.passed(), 0);
        assert_eq!(report.unscored(), 1);
    }

    #[tokio::test]
    async fn test_callback_sees_every_result() {
        let port = canned_server(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").await;
        let runner = Runner::new(options(port));

        let mut seen = Vec::new();
        let cases = vec![
            get_case("T-A", Expectation::success()),
            get_case("T-B", Expectation::success()),
        ];
        runner.run(cases, |r| seen.push(r.id)).await;

        assert_eq!(seen, vec!["T-A", "T-B"]);
    }

    #[tokio::test]
    async fn test_sequence_steps_share_one_connection() {
        // Keep-alive server: answers two requests on the same connection.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            for _ in 0..2 {
                let mut buf = [0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                socket
                    .write_all(b"HTTP/1.1 200 OK\r\nETag: \"abc\"\r\nContent-Length: 0\r\n\r\n")
                    .await
                    .unwrap();
            }
        });

        let case = Case::sequence(
            "T-SEQ",
            "two GETs over one connection",
            Category::Capabilities,
            "200",
            vec![
                Step::fixed("first", |t| {
                    format!(
                        "GET / HTTP/1.1\r\nHost: {}\r\nConnection: keep-alive\r\n\r\n",
                        t.host_header()
                    )
                    .into_bytes()
                }),
                Step::dynamic("second", |t, previous| {
                    let etag = previous[0].header("etag").unwrap_or("\"none\"");
                    format!(
                        "GET / HTTP/1.1\r\nHost: {}\r\nIf-None-Match: {etag}\r\n\r\n",
                        t.host_header()
                    )
                    .into_bytes()
                }),
            ],
            |steps| {
                if steps.iter().all(|s| s.executed && s.response.is_some()) {
                    Verdict::Pass
                } else {
                    Verdict::Fail
                }
            },
            |steps| steps[0].header("etag").map(|e| format!("ETag: {e}")),
        );

        let runner = Runner::new(options(port));
        let report = runner.run(vec![case], |_| {}).await;

        let result = &report.results[0];
        assert_eq!(result.verdict, Verdict::Pass);
        assert_eq!(result.note.as_deref(), Some("ETag: \"abc\""));
        assert!(result.raw_request.contains("── first ──"));
        assert!(result.raw_request.contains("If-None-Match: \"abc\""));
    }

    #[tokio::test]
    async fn test_sequence_step_after_close_not_executed() {
        // Server answers one request then closes.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Length: 0\r\n\r\n")
                .await;
        });

        let case = Case::sequence(
            "T-SEQ-CLOSE",
            "second step must not run",
            Category::Capabilities,
            "n/a",
            vec![
                Step::fixed("first", |t| {
                    format!("GET / HTTP/1.1\r\nHost: {}\r\n\r\n", t.host_header()).into_bytes()
                }),
                Step::fixed("second", |t| {
                    format!("GET / HTTP/1.1\r\nHost: {}\r\n\r\n", t.host_header()).into_bytes()
                }),
            ],
            |steps| {
                if steps[0].executed && !steps[1].executed {
                    Verdict::Pass
                } else {
                    Verdict::Fail
                }
            },
            |_| None,
        );

        let runner = Runner::new(options(port));
        let report = runner.run(vec![case], |_| {}).await;
        assert_eq!(report.results[0].verdict, Verdict::Pass);
    }
}
