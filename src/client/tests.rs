//! Tests for the raw TCP client.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::client::{ConnectionState, RawClient};

    const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
    const READ_TIMEOUT: Duration = Duration::from_millis(500);

    async fn connect(port: u16) -> RawClient {
        RawClient::connect("127.0.0.1", port, CONNECT_TIMEOUT, READ_TIMEOUT)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_read_complete_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nOK")
                .await
                .unwrap();
        });

        let mut client = connect(port).await;
        client.send(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await.unwrap();
        let outcome = client.read_response().await;

        assert!(outcome.data.starts_with(b"HTTP/1.1 200 OK"));
        assert!(!outcome.drain_caught_data);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_close_detected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let mut client = connect(port).await;
        let outcome = client.read_response().await;

        assert_eq!(outcome.state, ConnectionState::ClosedByServer);
        assert!(outcome.data.is_empty());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // Accept but never respond; keep the socket alive until the client
        // gives up.
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        let mut client = connect(port).await;
        client.send(b"GET / HTTP/1.1\r\n").await.unwrap();
        let outcome = client.read_response().await;

        assert_eq!(outcome.state, ConnectionState::TimedOut);
        server.abort();
    }

    #[tokio::test]
    async fn test_partial_response_then_stall_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // Dribble the start of a status line, then stall past the read
        // timeout without ever finishing the headers.
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await.unwrap();
            socket.write_all(b"HTTP/1.1 2").await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        let mut client = connect(port).await;
        client.send(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await.unwrap();
        let outcome = client.read_response().await;

        assert_eq!(outcome.state, ConnectionState::TimedOut);
        assert_eq!(outcome.data, b"HTTP/1.1 2");
        server.abort();
    }

    #[tokio::test]
    async fn test_drain_catches_second_flush() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n")
                .await
                .unwrap();
            socket.flush().await.unwrap();
            // Second flush lands while the client sits in its drain window.
            tokio::time::sleep(Duration::from_millis(30)).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
        });

        let mut client = connect(port).await;
        let outcome = client.read_response().await;

        assert!(outcome.drain_caught_data);
        server.abort();
    }

    #[tokio::test]
    async fn test_check_state_open_then_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let (close_tx, close_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            close_rx.await.unwrap();
            drop(socket);
        });

        let mut client = connect(port).await;
        assert_eq!(client.check_state().await, ConnectionState::Open);

        close_tx.send(()).unwrap();
        server.await.unwrap();
        // Give the FIN time to arrive.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(client.check_state().await, ConnectionState::ClosedByServer);
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind and drop to get a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = RawClient::connect("127.0.0.1", port, CONNECT_TIMEOUT, READ_TIMEOUT).await;
        assert!(result.is_err());
    }
}
