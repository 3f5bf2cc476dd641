//! Raw TCP client used to deliver probe payloads.
//!
//! The client never goes through an HTTP library on the sending side: probe
//! payloads are deliberately malformed and must reach the server byte for
//! byte. Reading is equally permissive: whatever the server sends back is
//! collected and handed to the response parser as-is.

mod error;
mod tests;

pub use error::Error;

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::{timeout, Instant};

/// Maximum number of response bytes collected per read.
pub const MAX_RESPONSE_BYTES: usize = 65536;

/// How long to wait after the headers arrive before draining late data.
const DRAIN_DELAY: Duration = Duration::from_millis(100);

/// Deadline for the non-destructive peek in [`RawClient::check_state`].
const PEEK_DEADLINE: Duration = Duration::from_millis(10);

/// What happened to the connection during or after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    /// The connection is still usable.
    Open,
    /// The server closed its end.
    ClosedByServer,
    /// The read timeout expired before a complete response arrived.
    TimedOut,
    /// An I/O error occurred.
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Open => "open",
            ConnectionState::ClosedByServer => "closed",
            ConnectionState::TimedOut => "timeout",
            ConnectionState::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// The result of reading a response from the wire.
#[derive(Debug)]
pub struct ReadOutcome {
    /// Everything the server sent, up to [`MAX_RESPONSE_BYTES`].
    pub data: Vec<u8>,
    /// The connection state after the read.
    pub state: ConnectionState,
    /// True if extra bytes arrived only during the post-header drain.
    /// A second flush after the response is a sign of confused framing.
    pub drain_caught_data: bool,
}

/// A raw TCP connection to the probe target.
pub struct RawClient {
    stream: TcpStream,
    read_timeout: Duration,
}

impl RawClient {
    /// Connect to `host:port`.
    ///
    /// Resolution prefers an IPv4 address when one is available, so that the
    /// probe exercises the same listener the benchmark servers bind.
    pub async fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, Error> {
        let addrs: Vec<SocketAddr> = lookup_host((host, port)).await?.collect();
        let addr = addrs
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| Error::Resolve(host.to_string()))?;

        let stream = timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::ConnectTimeout)??;
        stream.set_nodelay(true)?;
        debug!("Connected to {addr}");

        Ok(Self {
            stream,
            read_timeout,
        })
    }

    /// Send a payload in full.
    pub async fn send(&mut self, payload: &[u8]) -> Result<(), Error> {
        self.stream.write_all(payload).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read a response.
    ///
    /// Reads until the header terminator (`\r\n\r\n`) appears or the buffer
    /// limit is hit, then pauses briefly and drains whatever the server has
    /// already flushed without blocking. The read timeout covers the whole
    /// initial read.
    pub async fn read_response(&mut self) -> ReadOutcome {
        let mut data = Vec::new();
        let mut chunk = [0u8; 4096];
        let deadline = Instant::now() + self.read_timeout;
        let mut state = ConnectionState::Open;

        loop {
            if find_header_end(&data).is_some() || data.len() >= MAX_RESPONSE_BYTES {
                break;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                // Partial data does not soften a timeout: the caller needs to
                // know the server stalled before finishing its response.
                return ReadOutcome {
                    data,
                    state: ConnectionState::TimedOut,
                    drain_caught_data: false,
                };
            }

            match timeout(remaining, self.stream.read(&mut chunk)).await {
                Ok(Ok(0)) => {
                    return ReadOutcome {
                        data,
                        state: ConnectionState::ClosedByServer,
                        drain_caught_data: false,
                    };
                }
                Ok(Ok(n)) => data.extend_from_slice(&chunk[..n]),
                Ok(Err(e)) => {
                    warn!("Read error: {e}");
                    return ReadOutcome {
                        data,
                        state: ConnectionState::Error,
                        drain_caught_data: false,
                    };
                }
                Err(_) => {
                    return ReadOutcome {
                        data,
                        state: ConnectionState::TimedOut,
                        drain_caught_data: false,
                    };
                }
            }
        }

        // Give the server a moment, then pick up any second flush that is
        // already buffered. Data arriving here means the server wrote more
        // after its response, typically a sign it misread the framing.
        tokio::time::sleep(DRAIN_DELAY).await;
        let mut drain_caught_data = false;
        loop {
            match self.stream.try_read(&mut chunk) {
                Ok(0) => {
                    state = ConnectionState::ClosedByServer;
                    break;
                }
                Ok(n) => {
                    drain_caught_data = true;
                    data.extend_from_slice(&chunk[..n]);
                    if data.len() >= MAX_RESPONSE_BYTES {
                        data.truncate(MAX_RESPONSE_BYTES);
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!("Drain error: {e}");
                    state = ConnectionState::Error;
                    break;
                }
            }
        }

        ReadOutcome {
            data,
            state,
            drain_caught_data,
        }
    }

    /// Check whether the server has closed the connection without consuming
    /// any buffered data.
    pub async fn check_state(&mut self) -> ConnectionState {
        let mut probe = [0u8; 1];
        match timeout(PEEK_DEADLINE, self.stream.peek(&mut probe)).await {
            Ok(Ok(0)) => ConnectionState::ClosedByServer,
            Ok(Ok(_)) => ConnectionState::Open,
            Ok(Err(_)) => ConnectionState::Error,
            // No verdict within the deadline means nothing is pending.
            Err(_) => ConnectionState::Open,
        }
    }
}

/// Find the end of the header section, tolerating bare-LF line endings.
fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| i + 4)
        .or_else(|| data.windows(2).position(|w| w == b"\n\n").map(|i| i + 2))
}
