//! Header normalization probes.
//!
//! These send a malformed variant of a well-known header to an echo endpoint
//! and read the echoed request headers back out of the response body. A
//! server that silently rewrites `Content_Length` into `Content-Length` can
//! disagree with a proxy in front of it about message framing, so rejecting
//! or dropping the header passes, normalizing fails, and preserving it
//! verbatim warns.
//!
//! Echo bodies are expected as one `Name: value` line per header. Names are
//! taken verbatim up to the first colon, so trailing whitespace in a name is
//! significant.

use crate::cases::{Case, Category, Expectation, RfcLevel, Verdict};
use crate::client::ConnectionState;
use crate::response::HttpResponse;

const CAT: Category = Category::Normalization;
const EXPECTED: &str = "reject/drop";

/// What became of the malformed header in the echoed request.
enum Echo {
    /// Echoed under the standard name.
    Normalized(String),
    /// Echoed under the name as sent.
    Preserved(String),
    Absent,
}

fn parse_echo_headers(body: &str) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    for line in body.split('\n') {
        let Some(idx) = line.find(':') else { continue };
        if idx == 0 {
            continue;
        }
        let name = &line[..idx];
        let value = line[idx + 1..].trim_start().trim_end_matches('\r');
        headers.push((name.to_string(), value.to_string()));
    }
    headers
}

fn scan(body: &str, standard: &str, malformed: &str, probe: &str) -> Echo {
    if body.trim().is_empty() || !body.contains(':') {
        return Echo::Absent;
    }
    let headers = parse_echo_headers(body);

    // First pass: probe value under the standard name means it was rewritten.
    for (name, value) in &headers {
        if !value.eq_ignore_ascii_case(probe) {
            continue;
        }
        if name == standard && name != malformed {
            return Echo::Normalized(name.clone());
        }
        // Lowercasing servers still count as normalizing.
        if name.eq_ignore_ascii_case(standard) && !name.eq_ignore_ascii_case(malformed) {
            return Echo::Normalized(name.clone());
        }
    }

    // Second pass: probe value under the malformed name means it survived.
    for (name, value) in &headers {
        if value.eq_ignore_ascii_case(probe) && name.eq_ignore_ascii_case(malformed) {
            return Echo::Preserved(name.clone());
        }
    }

    Echo::Absent
}

fn expectation(standard: &'static str, malformed: &'static str, probe: &'static str) -> Expectation {
    Expectation::custom(EXPECTED, move |response, state| match response {
        None if state == ConnectionState::ClosedByServer => Verdict::Pass,
        None => Verdict::Fail,
        Some(r) if r.status_code >= 400 => Verdict::Pass,
        Some(r) if r.is_success() => match scan(&r.body, standard, malformed, probe) {
            Echo::Normalized(_) => Verdict::Fail,
            Echo::Preserved(_) => Verdict::Warn,
            Echo::Absent => Verdict::Pass,
        },
        Some(_) => Verdict::Fail,
    })
}

fn analyzer(
    standard: &'static str,
    malformed: &'static str,
    probe: &'static str,
) -> impl Fn(Option<&HttpResponse>) -> Option<String> + Send + Sync + 'static {
    move |response: Option<&HttpResponse>| {
        let r = response.filter(|r| r.is_success())?;
        if r.body.trim().is_empty() || !r.body.contains(':') {
            return Some("Static response".to_string());
        }
        Some(match scan(&r.body, standard, malformed, probe) {
            Echo::Normalized(name) => format!("Normalized: {malformed} → {name}"),
            Echo::Preserved(name) => format!("Preserved: {name}"),
            Echo::Absent => "Dropped".to_string(),
        })
    }
}

/// Casing-only variant: the malformed name IS the standard name uppercased,
/// so the scan must compare case-sensitively.
fn scan_casing(body: &str, standard: &str, original: &str, probe: &str) -> Echo {
    for (name, value) in parse_echo_headers(body) {
        if !value.eq_ignore_ascii_case(probe) {
            continue;
        }
        if name == original {
            return Echo::Preserved(name);
        }
        if name.eq_ignore_ascii_case(standard) {
            return Echo::Normalized(name);
        }
    }
    Echo::Absent
}

fn casing_expectation(
    standard: &'static str,
    original: &'static str,
    probe: &'static str,
) -> Expectation {
    Expectation::custom(EXPECTED, move |response, state| match response {
        None if state == ConnectionState::ClosedByServer => Verdict::Pass,
        None => Verdict::Fail,
        Some(r) if r.status_code >= 400 => Verdict::Pass,
        Some(r) if r.is_success() => {
            if r.body.trim().is_empty() || !r.body.contains(':') {
                return Verdict::Pass;
            }
            match scan_casing(&r.body, standard, original, probe) {
                Echo::Preserved(_) => Verdict::Warn,
                Echo::Normalized(_) => Verdict::Fail,
                Echo::Absent => Verdict::Pass,
            }
        }
        Some(_) => Verdict::Fail,
    })
}

fn casing_analyzer(
    standard: &'static str,
    original: &'static str,
    probe: &'static str,
) -> impl Fn(Option<&HttpResponse>) -> Option<String> + Send + Sync + 'static {
    move |response: Option<&HttpResponse>| {
        let r = response.filter(|r| r.is_success())?;
        if r.body.trim().is_empty() || !r.body.contains(':') {
            return Some("Static response".to_string());
        }
        Some(match scan_casing(&r.body, standard, original, probe) {
            Echo::Preserved(name) => format!("Preserved: {name}"),
            Echo::Normalized(name) => format!("Normalized: {original} → {name}"),
            Echo::Absent => "Dropped".to_string(),
        })
    }
}

pub fn cases() -> Vec<Case> {
    vec![
        Case::single(
            "NORM-UNDERSCORE-CL",
            "Underscore variant of Content-Length",
            CAT,
            |t| {
                format!(
                    "POST /echo HTTP/1.1\r\nHost: {host}\r\nContent-Length: 11\r\n\
                     Content_Length: 99\r\n\r\nhello world",
                    host = t.host_header()
                )
                .into_bytes()
            },
            expectation("Content-Length", "Content_Length", "99"),
        )
        .with_level(RfcLevel::NotApplicable)
        .with_analyzer(analyzer("Content-Length", "Content_Length", "99")),
        Case::single(
            "NORM-SP-BEFORE-COLON-CL",
            "Content-Length with a space before the colon",
            CAT,
            |t| {
                format!(
                    "POST /echo HTTP/1.1\r\nHost: {host}\r\nContent-Length: 11\r\n\
                     Content-Length : 5\r\n\r\nhello world",
                    host = t.host_header()
                )
                .into_bytes()
            },
            expectation("Content-Length", "Content-Length ", "5"),
        )
        .with_rfc("RFC 9112 §5")
        .with_analyzer(analyzer("Content-Length", "Content-Length ", "5")),
        Case::single(
            "NORM-TAB-IN-NAME",
            "Tab inside the Content-Length name",
            CAT,
            |t| {
                format!(
                    "POST /echo HTTP/1.1\r\nHost: {host}\r\nContent-Length: 11\r\n\
                     Content\tLength: 99\r\n\r\nhello world",
                    host = t.host_header()
                )
                .into_bytes()
            },
            expectation("Content-Length", "Content\tLength", "99"),
        )
        .with_analyzer(analyzer("Content-Length", "Content\tLength", "99")),
        Case::single(
            "NORM-CASE-TE",
            "All-uppercase TRANSFER-ENCODING",
            CAT,
            |t| {
                format!(
                    "POST /echo HTTP/1.1\r\nHost: {host}\r\nTRANSFER-ENCODING: chunked\r\n\r\n\
                     B\r\nhello world\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            casing_expectation("Transfer-Encoding", "TRANSFER-ENCODING", "chunked"),
        )
        .with_level(RfcLevel::NotApplicable)
        .unscored()
        .with_analyzer(casing_analyzer(
            "Transfer-Encoding",
            "TRANSFER-ENCODING",
            "chunked",
        )),
        Case::single(
            "NORM-UNDERSCORE-TE",
            "Underscore variant of Transfer-Encoding",
            CAT,
            |t| {
                format!(
                    "POST /echo HTTP/1.1\r\nHost: {host}\r\nTransfer_Encoding: chunked\r\n\r\n\
                     B\r\nhello world\r\n0\r\n\r\n",
                    host = t.host_header()
                )
                .into_bytes()
            },
            expectation("Transfer-Encoding", "Transfer_Encoding", "chunked"),
        )
        .with_level(RfcLevel::NotApplicable)
        .with_analyzer(analyzer("Transfer-Encoding", "Transfer_Encoding", "chunked")),
    ]
}
