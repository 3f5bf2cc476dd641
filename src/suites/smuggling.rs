//! Request smuggling surface probes.
//!
//! Ambiguous framing (Content-Length vs Transfer-Encoding, malformed chunk
//! syntax, header obfuscation) is the raw material of desync attacks, so
//! nearly everything here expects an outright rejection. The two pipeline
//! cases additionally send a second request on the same connection and record
//! how the server framed the first.

use std::time::Duration;

use crate::cases::{
    Case, Category, Expectation, RfcLevel, SendPart, Step, StepResult, Target, Verdict,
};
use crate::client::ConnectionState;

use super::{reject_or_warn, trailer_ignored};

const CAT: Category = Category::Smuggling;

fn get_root(t: &Target) -> Vec<u8> {
    format!(
        "GET / HTTP/1.1\r\nHost: {host}\r\n\r\n",
        host = t.host_header()
    )
    .into_bytes()
}

/// The desync expectation: a 400 or a close on the ambiguous request passes,
/// any other answer means the server picked a framing and is a smuggling
/// candidate.
fn reject_ambiguous() -> Expectation {
    Expectation::custom("400/close", |response, state| match response {
        Some(r) if r.status_code == 400 => Verdict::Pass,
        Some(_) => Verdict::Fail,
        None if state == ConnectionState::ClosedByServer => Verdict::Pass,
        None => Verdict::Fail,
    })
}

pub fn cases() -> Vec<Case> {
    let mut cases = vec![
        Case::single(
            "SMUG-CL-TE-BOTH",
            "Content-Length and Transfer-Encoding together",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 6\r\n\
                     Transfer-Encoding: chunked\r\n\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "SMUG-DUPLICATE-CL",
            "Two Content-Length headers with different values",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 5\r\n\
                     Content-Length: 10\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9110 §8.6"),
        Case::single(
            "SMUG-CL-LEADING-ZEROS",
            "Content-Length with leading zeros",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 005\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9110 §8.6"),
        Case::single(
            "SMUG-TE-XCHUNKED",
            "Unknown xchunked transfer coding next to Content-Length",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: xchunked\r\n\
                     Content-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "SMUG-TE-TRAILING-SPACE",
            "Transfer-Encoding value with a trailing space",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked \r\n\
                     Content-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "SMUG-TE-SP-BEFORE-COLON",
            "Space between Transfer-Encoding name and colon",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding : chunked\r\n\
                     Content-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §5"),
        Case::single(
            "SMUG-CL-NEGATIVE",
            "Negative Content-Length",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: -1\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9110 §8.6"),
        Case::single(
            "SMUG-CLTE-PIPELINE",
            "CL.TE ambiguity with a pipelined second request",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 4\r\n\
                     Transfer-Encoding: chunked\r\n\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_ambiguous(),
        )
        .with_rfc("RFC 9112 §6.1")
        .with_follow_up(get_root),
        Case::single(
            "SMUG-TECL-PIPELINE",
            "TE.CL ambiguity with a pipelined second request",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\
                     Content-Length: 30\r\n\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_ambiguous(),
        )
        .with_rfc("RFC 9112 §6.1")
        .with_follow_up(get_root),
        Case::single(
            "SMUG-CL-TRAILING-SPACE",
            "Content-Length value with a trailing space",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 5 \r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9110 §5.5"),
        Case::single(
            "SMUG-HEADER-INJECTION",
            "Apparent CRLF injection that is really two well-formed headers",
            CAT,
            |t| {
                format!(
                    "GET / HTTP/1.1\r\nHost: {host}\r\nX-Test: val\r\nInjected: yes\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9110 §5.5")
        .with_level(RfcLevel::NotApplicable)
        .unscored(),
        Case::single(
            "SMUG-TE-DOUBLE-CHUNKED",
            "Transfer-Encoding: chunked, chunked",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\n\
                     Transfer-Encoding: chunked, chunked\r\nContent-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "SMUG-CL-EXTRA-LEADING-SP",
            "Content-Length with extra leading whitespace",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length:  5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9110 §5.5"),
        Case::single(
            "SMUG-TE-CASE-MISMATCH",
            "Transfer-Encoding: Chunked with unusual case",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: Chunked\r\n\
                     Content-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "SMUG-CL-COMMA-DIFFERENT",
            "Comma-joined Content-Length with different values",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 5, 10\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9110 §8.6"),
        Case::single(
            "SMUG-TE-NOT-FINAL-CHUNKED",
            "Chunked is not the final transfer coding",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\n\
                     Transfer-Encoding: chunked, gzip\r\n\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7"),
        Case::single(
            "SMUG-TE-HTTP10",
            "Transfer-Encoding on an HTTP/1.0 request",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.0\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\
                     Content-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "SMUG-CHUNK-BARE-SEMICOLON",
            "Chunk size followed by a bare semicolon",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5;\r\nhello\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1.1"),
        Case::single(
            "SMUG-BARE-CR-HEADER-VALUE",
            "Bare CR inside a header value",
            CAT,
            |t| {
                let mut bytes = format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 5\r\nX-Test: val",
                    host = t.host_header()
                )
                .into_bytes();
                bytes.push(0x0d);
                bytes.extend_from_slice(b"ue\r\n\r\nhello");
                bytes
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §2.2"),
        Case::single(
            "SMUG-CL-OCTAL",
            "Content-Length in octal notation",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 0o5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9110 §8.6"),
        Case::single(
            "SMUG-CHUNK-UNDERSCORE",
            "Chunk size with an underscore digit separator",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     1_0\r\nhello world!!!!!\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "SMUG-TE-EMPTY-VALUE",
            "Empty Transfer-Encoding value next to Content-Length",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: \r\n\
                     Content-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "SMUG-TE-LEADING-COMMA",
            "Transfer-Encoding value with a leading comma",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: , chunked\r\n\
                     Content-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "SMUG-TE-DUPLICATE-HEADERS",
            "Two Transfer-Encoding headers next to Content-Length",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\
                     Transfer-Encoding: identity\r\nContent-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "SMUG-CHUNK-HEX-PREFIX",
            "Chunk size with a 0x prefix",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     0x5\r\nhello\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "SMUG-CL-HEX-PREFIX",
            "Content-Length with a 0x prefix",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 0x5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9110 §8.6"),
        Case::single(
            "SMUG-CL-INTERNAL-SPACE",
            "Content-Length with an internal space",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 1 0\r\n\r\nhello12345",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9110 §8.6"),
        Case::single(
            "SMUG-CHUNK-LEADING-SP",
            "Chunk size with a leading space",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n \
                     5\r\nhello\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "SMUG-CHUNK-MISSING-TRAILING-CRLF",
            "Chunk data not followed by CRLF",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5\r\nhello0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "SMUG-CHUNK-EXT-LF",
            "Bare LF terminating a chunk-size line with extension",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5;\nhello\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "SMUG-CHUNK-SPILL",
            "Chunk data longer than the declared size",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5\r\nhello!!\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "SMUG-CHUNK-LF-TERM",
            "Chunk data terminated by a bare LF",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5\r\nhello\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "SMUG-CHUNK-EXT-CTRL",
            "NUL byte inside a chunk extension",
            CAT,
            |t| {
                let mut bytes = format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n5;",
                    host = t.host_header()
                )
                .into_bytes();
                bytes.push(0x00);
                bytes.extend_from_slice(b"ext\r\nhello\r\n0\r\n\r\n");
                bytes
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1.1"),
        Case::single(
            "SMUG-CHUNK-EXT-CR",
            "Bare CR inside a chunk extension",
            CAT,
            |t| {
                let mut bytes = format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n5;a",
                    host = t.host_header()
                )
                .into_bytes();
                bytes.push(0x0d);
                bytes.extend_from_slice(b"X\r\nhello\r\n0\r\n\r\n");
                bytes
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1.1"),
        Case::single(
            "SMUG-TE-VTAB",
            "Vertical tab before the chunked coding name",
            CAT,
            |t| {
                let mut bytes = format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: ",
                    host = t.host_header()
                )
                .into_bytes();
                bytes.push(0x0b);
                bytes.extend_from_slice(b"chunked\r\nContent-Length: 5\r\n\r\nhello");
                bytes
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "SMUG-TE-FORMFEED",
            "Form feed before the chunked coding name",
            CAT,
            |t| {
                let mut bytes = format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: ",
                    host = t.host_header()
                )
                .into_bytes();
                bytes.push(0x0c);
                bytes.extend_from_slice(b"chunked\r\nContent-Length: 5\r\n\r\nhello");
                bytes
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "SMUG-TE-NULL",
            "NUL byte after the chunked coding name",
            CAT,
            |t| {
                let mut bytes = format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked",
                    host = t.host_header()
                )
                .into_bytes();
                bytes.push(0x00);
                bytes.extend_from_slice(b"\r\nContent-Length: 5\r\n\r\nhello");
                bytes
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §6.1"),
        Case::single(
            "SMUG-CHUNK-LF-TRAILER",
            "Bare LF terminating the trailer section",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5\r\nhello\r\n0\r\n\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "SMUG-TE-IDENTITY",
            "Transfer-Encoding: identity next to Content-Length",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: identity\r\n\
                     Content-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7"),
        Case::single(
            "SMUG-CHUNK-NEGATIVE",
            "Negative chunk size",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     -1\r\nhello\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            Expectation::status(400).or_close(),
        )
        .with_rfc("RFC 9112 §7.1"),
        Case::single(
            "SMUG-TRANSFER_ENCODING",
            "Underscore in the Transfer-Encoding header name",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer_Encoding: chunked\r\n\
                     Content-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9112 §6.1")
        .with_level(RfcLevel::NotApplicable)
        .unscored(),
        Case::single(
            "SMUG-CL-COMMA-SAME",
            "Comma-joined Content-Length with identical values",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 5, 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9110 §8.6")
        .with_level(RfcLevel::May)
        .unscored(),
        Case::single(
            "SMUG-CHUNKED-WITH-PARAMS",
            "Chunked coding with a parameter",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\n\
                     Transfer-Encoding: chunked;ext=val\r\nContent-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9112 §7")
        .with_level(RfcLevel::May)
        .unscored(),
        Case::single(
            "SMUG-EXPECT-100-CL",
            "Expect: 100-continue with a fully-sent body",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 5\r\n\
                     Expect: 100-continue\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9110 §10.1.1")
        .with_level(RfcLevel::May)
        .unscored(),
        Case::single(
            "SMUG-TRAILER-CL",
            "Content-Length in the chunked trailer section",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5\r\nhello\r\n0\r\nContent-Length: 50\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            trailer_ignored(),
        )
        .with_rfc("RFC 9110 §6.5.1")
        .unscored(),
        Case::single(
            "SMUG-TRAILER-TE",
            "Transfer-Encoding in the chunked trailer section",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5\r\nhello\r\n0\r\nTransfer-Encoding: chunked\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            trailer_ignored(),
        )
        .with_rfc("RFC 9110 §6.5.1")
        .unscored(),
        Case::single(
            "SMUG-TRAILER-HOST",
            "Host in the chunked trailer section",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5\r\nhello\r\n0\r\nHost: evil.example.com\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            trailer_ignored(),
        )
        .with_rfc("RFC 9110 §6.5.2")
        .unscored(),
        Case::single(
            "SMUG-TRAILER-AUTH",
            "Authorization in the chunked trailer section",
            CAT,
            |t| {
                format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nTransfer-Encoding: chunked\r\n\r\n\
                     5\r\nhello\r\n0\r\nAuthorization: Bearer evil\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            trailer_ignored(),
        )
        .with_rfc("RFC 9110 §6.5.1")
        .unscored(),
        Case::single(
            "SMUG-HEAD-CL-BODY",
            "HEAD request carrying a body",
            CAT,
            |t| {
                format!(
                    "HEAD / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9110 §9.3.2")
        .with_level(RfcLevel::May)
        .unscored(),
        Case::single(
            "SMUG-OPTIONS-CL-BODY",
            "OPTIONS request carrying a body",
            CAT,
            |t| {
                format!(
                    "OPTIONS / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 5\r\n\r\nhello",
                    host = t.host_header()
                )
                .into_bytes()
            },
            reject_or_warn(&[400]),
        )
        .with_rfc("RFC 9110 §9.3.7")
        .with_level(RfcLevel::May)
        .unscored(),
    ];
    cases.push(clte_pause_sequence());
    cases
}

/// CL.TE ambiguity delivered with a mid-body pause, then a pipelined GET on
/// the same connection. A server that buffered the whole request before
/// framing it can behave differently from one parsing incrementally.
fn clte_pause_sequence() -> Case {
    Case::sequence(
        "SMUG-CLTE-PAUSE",
        "CL.TE ambiguity split across a timed pause",
        CAT,
        "400/close",
        vec![
            Step::parts("ambiguous request in two writes", |t: &Target| {
                let head = format!(
                    "POST / HTTP/1.1\r\nHost: {host}\r\nContent-Length: 4\r\n\
                     Transfer-Encoding: chunked\r\n\r\n",
                    host = t.host_header()
                );
                vec![
                    SendPart {
                        bytes: head.into_bytes(),
                        delay_after: Duration::from_millis(150),
                    },
                    SendPart {
                        bytes: b"0\r\n\r\n".to_vec(),
                        delay_after: Duration::ZERO,
                    },
                ]
            }),
            Step::fixed("pipelined GET", get_root),
        ],
        |steps: &[StepResult]| {
            let first = match steps.first() {
                Some(s) => s,
                None => return Verdict::Error,
            };
            let rejected = matches!(&first.response, Some(r) if r.status_code == 400)
                || first.state == ConnectionState::ClosedByServer;
            if rejected {
                return Verdict::Pass;
            }
            match steps.get(1) {
                Some(s) if !s.executed => Verdict::Pass,
                Some(s) if matches!(&s.response, Some(r) if r.is_success()) => Verdict::Fail,
                Some(_) => Verdict::Warn,
                None => Verdict::Error,
            }
        },
        |steps: &[StepResult]| {
            let first = steps.first()?;
            let answered = steps
                .get(1)
                .map(|s| s.executed && s.response.is_some())
                .unwrap_or(false);
            let code = first
                .response
                .as_ref()
                .map(|r| r.status_code.to_string())
                .unwrap_or_else(|| first.state.to_string());
            Some(if answered {
                format!("Ambiguous request answered {code}, pipelined request also served")
            } else {
                format!("Ambiguous request answered {code}, connection not reused")
            })
        },
    )
    .with_rfc("RFC 9112 §6.1")
}
