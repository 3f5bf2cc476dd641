//! Lenient HTTP response parsing.
//!
//! The probe sends deliberately malformed requests, so the servers it talks
//! to may answer with anything from a pristine response to a half-written
//! error page. This parser extracts as much as it can instead of insisting
//! on a well-formed message: unparseable header lines are skipped, and only
//! a missing or broken status line is fatal.

mod error;
mod tests;

pub use error::Error;

use std::collections::HashMap;
use std::str::FromStr;

/// Maximum number of body characters kept on a parsed response.
pub const BODY_CAP: usize = 4096;

/// Maximum number of raw characters kept on a parsed response.
pub const RAW_CAP: usize = 8192;

/// A parsed HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The HTTP version from the status line, e.g. "1.1".
    pub version: String,
    /// The status code.
    pub status_code: u16,
    /// The reason phrase, possibly empty.
    pub reason: String,
    /// Headers keyed by lowercase name. Duplicate headers are joined with ", ".
    pub headers: HashMap<String, String>,
    /// The body text, truncated to [`BODY_CAP`] characters.
    pub body: String,
    /// The raw response text, truncated to [`RAW_CAP`] characters.
    pub raw: String,
}

impl HttpResponse {
    /// Get a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// True if the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Parse an HTTP response from raw bytes.
///
/// Non-UTF-8 bytes are replaced rather than rejected. Header lines without
/// a colon are skipped. Returns an error only when the status line itself
/// cannot be understood.
pub fn parse_response(input: &[u8]) -> Result<HttpResponse, Error> {
    if input.is_empty() {
        return Err(Error::EmptyResponse);
    }

    let text = String::from_utf8_lossy(input);
    let raw = truncate_chars(&text, RAW_CAP);

    if !text.starts_with("HTTP/") {
        return Err(Error::NotHttp);
    }

    // Split the header section from the body at the first blank line.
    let (head, body) = match text.split_once("\r\n\r\n") {
        Some((head, body)) => (head, body),
        None => (text.as_ref(), ""),
    };

    let mut lines = head.lines();
    let status_line = lines.next().ok_or(Error::EmptyResponse)?;
    let (version, status_code, reason) = parse_status_line(status_line)?;

    // Headers are case-insensitive; duplicates are combined per RFC 9110 §5.3.
    let mut headers: HashMap<String, String> = HashMap::new();
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        let value = value.trim().to_string();
        headers
            .entry(name)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    Ok(HttpResponse {
        version,
        status_code,
        reason,
        headers,
        body: truncate_chars(body, BODY_CAP),
        raw,
    })
}

/// Parse a status line of the form `HTTP/x.x SSS Reason`.
fn parse_status_line(line: &str) -> Result<(String, u16, String), Error> {
    let mut parts = line.splitn(3, ' ');

    let version_token = parts
        .next()
        .ok_or_else(|| Error::MalformedStatusLine(line.to_string()))?;
    let version = version_token
        .strip_prefix("HTTP/")
        .ok_or_else(|| Error::MalformedStatusLine(line.to_string()))?
        .to_string();

    let code_token = parts
        .next()
        .ok_or_else(|| Error::MalformedStatusLine(line.to_string()))?;
    let status_code = u16::from_str(code_token)
        .map_err(|_| Error::InvalidStatusCode(code_token.to_string()))?;
    if !(100..1000).contains(&status_code) {
        return Err(Error::InvalidStatusCode(code_token.to_string()));
    }

    let reason = parts.next().unwrap_or("").trim_end().to_string();

    Ok((version, status_code, reason))
}

/// Truncate a string to at most `max` bytes without splitting a character.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
