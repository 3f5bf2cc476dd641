//! RFC 9110/9112 message syntax compliance probes.
//!
//! The bulk of these send one deliberately malformed request and expect the
//! server to answer 400 or drop the connection. A handful probe behaviors the
//! RFCs leave to the server and only warn on lenient answers.

use crate::cases::{Case, Category, Expectation, RfcLevel, Verdict};
use crate::client::ConnectionState;

use super::{no_switch, reject_close_or_timeout, reject_or_warn};

const CAT: Category = Category::Compliance;

pub fn cases() -> Vec<Case> {
    vec![
        Case::single(
            "COMP-BASELINE",
            "Plain GET / must succeed",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::success(),
        )
        .with_rfc("RFC 9112 §3"),
        Case::single(
            "RFC9112-2.2-BARE-LF-REQUEST-LINE",
            "Bare LF terminating the request line",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §2.2"),
        Case::single(
            "RFC9112-2.2-BARE-LF-HEADER",
            "Bare LF terminating a header line",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\nX-Test: value\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §2.2"),
        Case::single(
            "RFC9112-5.1-OBS-FOLD",
            "Obsolete line folding in a header value",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nX-Test: value\r\n continued\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400),
        )
        .with_rfc("RFC 9112 §5.1"),
        Case::single(
            "RFC9110-5.6.2-SP-BEFORE-COLON",
            "Whitespace between header name and colon",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nX-Test : value\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400),
        )
        .with_rfc("RFC 9110 §5.6.2"),
        Case::single(
            "RFC9112-3-MULTI-SP-REQUEST-LINE",
            "Multiple spaces between request-line components",
            CAT,
            |t| {
                format!(
                    "GET  / HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §3"),
        Case::single(
            "RFC9112-7.1-MISSING-HOST",
            "HTTP/1.1 request without a Host header",
            CAT,
            |_| b"GET / HTTP/1.1\r\n\r\n".to_vec(),
            Expectation::status(400),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "RFC9112-2.3-INVALID-VERSION",
            "Unsupported protocol version HTTP/9.9",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/9.9\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::any_of(&[400, 505]).or_close(),
        )
        .with_rfc("RFC 9112 §2.3"),
        Case::single(
            "RFC9112-5-EMPTY-HEADER-NAME",
            "Header line with an empty field name",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\n: empty-name\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §5"),
        Case::single(
            "RFC9112-3-CR-ONLY-LINE-ENDING",
            "Request line terminated by a lone CR",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\rHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400),
        )
        .with_rfc("RFC 9112 §3"),
        Case::single(
            "RFC9112-3-MISSING-TARGET",
            "Request line without a request target",
            CAT,
            |t| {
                format!(
                    "GET HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §3"),
        Case::single(
            "RFC9112-3.2-FRAGMENT-IN-TARGET",
            "Fragment component in the request target",
            CAT,
            |t| {
                format!(
                    "GET /path#frag HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §3.2"),
        Case::single(
            "RFC9112-2.3-HTTP09-REQUEST",
            "HTTP/0.9 style request without a version",
            CAT,
            |_| b"GET /\r\n".to_vec(),
            reject_close_or_timeout(&[400]),
        )
        .with_rfc("RFC 9112 §2.3"),
        Case::single(
            "RFC9112-5-INVALID-HEADER-NAME",
            "Header name with an illegal character",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nBad[Name: value\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §5"),
        Case::single(
            "RFC9112-5-HEADER-NO-COLON",
            "Header line without a colon",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nNoColonHere\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §5"),
        Case::single(
            "RFC9110-5.4-DUPLICATE-HOST",
            "Two Host headers with different values",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nHost: other.example.com\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400),
        )
        .with_rfc("RFC 9112 §3.2"),
        Case::single(
            "RFC9112-6.1-CL-NON-NUMERIC",
            "Non-numeric Content-Length",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: abc\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "RFC9112-6.1-CL-PLUS-SIGN",
            "Content-Length with a leading plus sign",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: +5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "COMP-WHITESPACE-BEFORE-HEADERS",
            "Whitespace-only line before the header block",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\n \r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §2.2"),
        Case::single(
            "COMP-DUPLICATE-HOST-SAME",
            "Two Host headers with the same value",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400),
        )
        .with_rfc("RFC 9112 §3.2"),
        Case::single(
            "COMP-HOST-WITH-USERINFO",
            "Host header carrying userinfo",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: user@{host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "COMP-HOST-WITH-PATH",
            "Host header carrying a path",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}/path\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "COMP-ASTERISK-WITH-GET",
            "Asterisk-form target with GET",
            CAT,
            |t| {
                format!(
                    "GET * HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §3.2.4"),
        Case::single(
            "COMP-OPTIONS-STAR",
            "Asterisk-form target with OPTIONS",
            CAT,
            |t| {
                format!(
                    "OPTIONS * HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::success(),
        )
        .with_rfc("RFC 9112 §3.2.4")
        .with_level(RfcLevel::Should),
        Case::single(
            "COMP-UNKNOWN-TE-501",
            "Unknown transfer coding without Content-Length",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: gzip\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::any_of(&[400, 501]).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "COMP-LEADING-CRLF",
            "Empty lines before the request line",
            CAT,
            |t| {
                format!(
                    "\r\n\r\nGET / HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9112 §2.2")
        .with_level(RfcLevel::May),
        Case::single(
            "COMP-ABSOLUTE-FORM",
            "Absolute-form target sent to an origin server",
            CAT,
            |t| {
                format!(
                    "GET http://{host}/ HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9112 §3.2.2")
        .with_level(RfcLevel::May),
        Case::single(
            "COMP-METHOD-CASE",
            "Lowercase method name",
            CAT,
            |t| {
                format!(
                    "get / HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400, 405, 501]),
        )
        .with_rfc("RFC 9110 §9.1"),
        Case::single(
            "COMP-CONNECT-EMPTY-PORT",
            "CONNECT target with an empty port",
            CAT,
            |t| {
                format!(
                    "CONNECT {host}: HTTP/1.1\r\nHost: {host}:\r\n\r\n",
                    host = t.host
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §3.2.3"),
        Case::single(
            "COMP-POST-CL-BODY",
            "POST with a correct Content-Length body",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::success(),
        )
        .with_rfc("RFC 9112 §6.2"),
        Case::single(
            "COMP-POST-CL-ZERO",
            "POST with Content-Length: 0",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::success().or_close(),
        )
        .with_rfc("RFC 9112 §6.2"),
        Case::single(
            "COMP-POST-NO-CL-NO-TE",
            "POST without Content-Length or Transfer-Encoding",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::success().or_close(),
        )
        .with_rfc("RFC 9112 §6"),
        Case::single(
            "COMP-POST-CL-UNDERSEND",
            "Body shorter than the declared Content-Length",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 10\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_close_or_timeout(&[400]),
        )
        .with_rfc("RFC 9112 §6.3"),
        Case::single(
            "COMP-CHUNKED-BODY",
            "Well-formed chunked body",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5\r\nhello\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::success(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "COMP-CHUNKED-MULTI",
            "Chunked body split over several chunks",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::success(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "COMP-CHUNKED-EMPTY",
            "Chunked body with only the terminating chunk",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::success().or_close(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "COMP-CHUNKED-NO-FINAL",
            "Chunked body missing the terminating chunk",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5\r\nhello\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_close_or_timeout(&[400]),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "COMP-UPGRADE-POST",
            "WebSocket upgrade attempted with POST",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nConnection: Upgrade\r\n\
                     Upgrade: websocket\r\nSec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
                     Sec-WebSocket-Version: 13\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            no_switch(),
        )
        .with_rfc("RFC 6455 §4.1")
        .with_level(RfcLevel::Should),
        Case::single(
            "COMP-UPGRADE-MISSING-CONN",
            "Upgrade header without Connection: Upgrade",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nUpgrade: websocket\r\n\
                     Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
                     Sec-WebSocket-Version: 13\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            no_switch(),
        )
        .with_rfc("RFC 9110 §7.8")
        .with_level(RfcLevel::Should),
        Case::single(
            "COMP-UPGRADE-UNKNOWN",
            "Upgrade to an unknown protocol",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nConnection: Upgrade\r\n\
                     Upgrade: totally-made-up/1.0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            no_switch(),
        )
        .with_rfc("RFC 9110 §7.8")
        .with_level(RfcLevel::Should),
        Case::single(
            "COMP-METHOD-CONNECT",
            "CONNECT to an external authority",
            CAT,
            |_| {
                b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\n\r\n".to_vec()
            },
            Expectation::any_of(&[400, 405, 501]).or_close(),
        )
        .with_rfc("RFC 9110 §9.3.6"),
        Case::single(
            "COMP-METHOD-CONNECT-NO-PORT",
            "CONNECT target without a port",
            CAT,
            |_| b"CONNECT example.com HTTP/1.1\r\nHost: example.com\r\n\r\n".to_vec(),
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §3.2.3"),
        Case::single(
            "COMP-EXPECT-UNKNOWN",
            "Unknown Expect expectation",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nExpect: 200-ok\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::custom("417", |response, state| match response {
                Some(r) if r.status_code == 417 => Verdict::Pass,
                Some(r) if r.is_success() => Verdict::Warn,
                Some(_) => Verdict::Fail,
                None if state == ConnectionState::ClosedByServer => Verdict::Pass,
                None => Verdict::Fail,
            }),
        )
        .with_rfc("RFC 9110 §10.1.1")
        .with_level(RfcLevel::May),
        Case::single(
            "COMP-GET-WITH-CL-BODY",
            "GET carrying a Content-Length body",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9110 §9.3.1")
        .with_level(RfcLevel::May)
        .unscored(),
        Case::single(
            "COMP-CHUNKED-EXTENSION",
            "Chunk size with a chunk extension",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5;ext=value\r\nhello\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::custom("2xx", |response, state| match response {
                Some(r) if r.is_success() => Verdict::Pass,
                Some(r) if r.status_code == 400 => Verdict::Warn,
                Some(_) => Verdict::Fail,
                None if state == ConnectionState::ClosedByServer => Verdict::Warn,
                None => Verdict::Fail,
            }),
        )
        .with_rfc("RFC 9112 §7.1.1")
        .with_level(RfcLevel::May)
        .unscored(),
        Case::single(
            "COMP-UPGRADE-INVALID-VER",
            "WebSocket upgrade with an unsupported version",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nConnection: Upgrade\r\n\
                     Upgrade: websocket\r\nSec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
                     Sec-WebSocket-Version: 99\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::custom("426/not 101", |response, state| match response {
                Some(r) if r.status_code == 101 => Verdict::Fail,
                Some(r) if r.status_code == 426 => Verdict::Pass,
                Some(_) => Verdict::Warn,
                None if state == ConnectionState::ClosedByServer => Verdict::Warn,
                None => Verdict::Fail,
            }),
        )
        .with_rfc("RFC 6455 §4.2.2")
        .with_level(RfcLevel::Should)
        .unscored(),
        Case::single(
            "COMP-METHOD-TRACE",
            "TRACE method support",
            CAT,
            |t| {
                format!(
                    "TRACE / HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::custom("405/501", |response, state| match response {
                Some(r) if matches!(r.status_code, 405 | 501) => Verdict::Pass,
                Some(_) => Verdict::Warn,
                None if state == ConnectionState::ClosedByServer => Verdict::Pass,
                None => Verdict::Fail,
            }),
        )
        .with_rfc("RFC 9110 §9.3.8")
        .with_level(RfcLevel::May)
        .unscored(),
    ]
}
