//! Robustness probes with garbage and oversized input.
//!
//! None of these are valid HTTP. The server just has to survive them and
//! either reject cleanly or hang up without crashing.

use crate::cases::{Case, Category, Expectation, Target};

use super::reject_close_or_timeout;

const CAT: Category = Category::MalformedInput;
const BIG: usize = 100_000;

/// Deterministic pseudo-random bytes so reruns send identical garbage.
fn garbage(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        out.push((state >> 24) as u8);
    }
    out
}

fn big_string(fill: char) -> String {
    std::iter::repeat(fill).take(BIG).collect()
}

pub fn cases() -> Vec<Case> {
    vec![
        Case::single(
            "MAL-BINARY-GARBAGE",
            "256 bytes of binary garbage",
            CAT,
            |_| garbage(256, 42),
            reject_close_or_timeout(&[400]),
        ),
        Case::single(
            "MAL-LONG-URL",
            "100KB request target",
            CAT,
            |t| {
                format!(
                    "GET /{path} HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    path = big_string('A'),
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::any_of(&[400, 414, 431]).or_close(),
        ),
        Case::single(
            "MAL-LONG-HEADER-VALUE",
            "100KB header value",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nX-Big: {value}\r\n\r\n",
                    host = t.host_header(),
                    value = big_string('B')
                )
                .into_bytes()
            },
            Expectation::any_of(&[400, 431]).or_close(),
        ),
        Case::single(
            "MAL-MANY-HEADERS",
            "10,000 distinct headers",
            CAT,
            |t| {
                let mut request = format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\n",
                    host = t.host_header()
                );
                for i in 0..10_000 {
                    request.push_str(&format!("X-H-{i}: value\r\n"));
                }
                request.push_str("\r\n");
                request.into_bytes()
            },
            Expectation::any_of(&[400, 431]).or_close(),
        ),
        Case::single(
            "MAL-NUL-IN-URL",
            "NUL byte in the request target",
            CAT,
            |t| {
                let mut bytes = b"GET /".to_vec();
                bytes.push(0x00);
                bytes.extend_from_slice(
                    format!(
                        "test HTTP/1.1\r\nHost: {host}\r\n\r\n",
                        host = t.host_header()
                    )
                    .as_bytes(),
                );
                bytes
            },
            Expectation::status(400).or_close(),
        ),
        Case::single(
            "MAL-CONTROL-CHARS-HEADER",
            "Control characters in a header value",
            CAT,
            |t| {
                let mut bytes = format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nX-Test: abc",
                    host = t.host_header()
                )
                .into_bytes();
                bytes.extend_from_slice(&[0x07, 0x08, 0x0b]);
                bytes.extend_from_slice(b"def\r\n\r\n");
                bytes
            },
            Expectation::status(400).or_close(),
        ),
        Case::single(
            "MAL-INCOMPLETE-REQUEST",
            "Request cut off before the final CRLF",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nX-Test: value",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_close_or_timeout(&[400]),
        ),
        Case::single(
            "MAL-EMPTY-REQUEST",
            "Connection opened, nothing sent",
            CAT,
            |_| Vec::new(),
            reject_close_or_timeout(&[400]),
        ),
        Case::single(
            "MAL-LONG-HEADER-NAME",
            "100KB header name",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\n{name}: val\r\n\r\n",
                    host = t.host_header(),
                    name = big_string('A')
                )
                .into_bytes()
            },
            Expectation::any_of(&[400, 431]).or_close(),
        ),
        Case::single(
            "MAL-LONG-METHOD",
            "100KB method name",
            CAT,
            |t| {
                format!(
                    "{method} / HTTP/1.1\r\nHost: {host}\r\n\r\n",
                    method = big_string('A'),
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        ),
        Case::single(
            "MAL-NON-ASCII-HEADER-NAME",
            "Non-ASCII byte in a header name",
            CAT,
            |t| {
                let mut bytes = format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nX-T",
                    host = t.host_header()
                )
                .into_bytes();
                bytes.extend_from_slice(&[0xc3, 0xab]);
                bytes.extend_from_slice(b"st: value\r\n\r\n");
                bytes
            },
            Expectation::status(400).or_close(),
        ),
        Case::single(
            "MAL-NON-ASCII-URL",
            "Raw UTF-8 in the request target",
            CAT,
            |t| {
                let mut bytes = b"GET /caf".to_vec();
                bytes.extend_from_slice(&[0xc3, 0xa9]);
                bytes.extend_from_slice(
                    format!(" HTTP/1.1\r\nHost: {host}\r\n\r\n", host = t.host_header())
                        .as_bytes(),
                );
                bytes
            },
            Expectation::status(400).or_close(),
        ),
        Case::single(
            "MAL-CL-OVERFLOW",
            "Content-Length overflowing 64 bits",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\n\
                     Content-Length: 99999999999999999999\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        ),
        Case::single(
            "MAL-WHITESPACE-ONLY-LINE",
            "Whitespace-only request line",
            CAT,
            |_| b"   \r\n\r\n".to_vec(),
            reject_close_or_timeout(&[400]),
        ),
        Case::single(
            "MAL-NUL-IN-HEADER-VALUE",
            "NUL byte in a header value",
            CAT,
            |t| {
                let mut bytes = format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nX-Test: val",
                    host = t.host_header()
                )
                .into_bytes();
                bytes.push(0x00);
                bytes.extend_from_slice(b"ue\r\n\r\n");
                bytes
            },
            Expectation::status(400).or_close(),
        ),
        Case::single(
            "MAL-CHUNK-SIZE-OVERFLOW",
            "Chunk size overflowing 64 bits",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     FFFFFFFFFFFFFFFF0\r\nhello\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        ),
        Case::single(
            "MAL-H2-PREFACE",
            "HTTP/2 connection preface on a cleartext socket",
            CAT,
            |_| b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n".to_vec(),
            reject_close_or_timeout(&[400, 505]),
        ),
        Case::single(
            "MAL-CHUNK-EXTENSION-LONG",
            "100KB chunk extension",
            CAT,
            |t: &Target| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5;ext={ext}\r\nhello\r\n0\r\n\r\n",
                    host = t.host_header(),
                    ext = big_string('A')
                )
                .into_bytes()
            },
            Expectation::any_of(&[400, 431]).or_close(),
        ),
    ]
}
