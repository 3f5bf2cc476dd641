//! Conditional request capability probes.
//!
//! All of these are informational rather than scored. Each runs two requests
//! over one keep-alive connection: an initial GET to capture a validator
//! (ETag or Last-Modified), then a conditional GET replaying it. A server
//! with no conditional support warns, it never fails; a failure means the
//! server answered the conditional request with something nonsensical.

use crate::cases::{Case, Category, RfcLevel, Step, StepResult, Target, Verdict};
use crate::response::HttpResponse;

const CAT: Category = Category::Capabilities;

fn initial_get(t: &Target) -> Vec<u8> {
    format!(
        "GET / HTTP/1.1\r\nHost: {host}\r\nConnection: keep-alive\r\n\r\n",
        host = t.host_header()
    )
    .into_bytes()
}

fn conditional_get(t: &Target, field: &str, value: &str) -> Vec<u8> {
    format!(
        "GET / HTTP/1.1\r\nHost: {host}\r\n{field}: {value}\r\n\r\n",
        host = t.host_header()
    )
    .into_bytes()
}

/// Shared validator prelude. A broken first exchange is an [`Verdict::Error`];
/// a missing capture header or a dead connection before the conditional
/// request downgrades to [`Verdict::Warn`]. On success the conditional
/// response is handed back for grading.
fn second_response<'a>(
    steps: &'a [StepResult],
    capture: Option<&str>,
) -> Result<&'a HttpResponse, Verdict> {
    let first = steps.first().filter(|s| s.executed).ok_or(Verdict::Error)?;
    let first_response = first.response.as_ref().ok_or(Verdict::Error)?;
    if !first_response.is_success() {
        return Err(Verdict::Error);
    }
    if let Some(name) = capture {
        if first.header(name).is_none() {
            return Err(Verdict::Warn);
        }
    }
    let second = steps.get(1).filter(|s| s.executed).ok_or(Verdict::Warn)?;
    second.response.as_ref().ok_or(Verdict::Warn)
}

/// Analyzer counterpart of [`second_response`]: either the note explaining
/// why the sequence stopped short, or the conditional response.
fn second_or_note<'a>(
    steps: &'a [StepResult],
    capture: Option<&str>,
    missing_note: &str,
) -> Result<&'a HttpResponse, String> {
    let first_response = steps
        .first()
        .filter(|s| s.executed)
        .and_then(|s| s.response.as_ref())
        .ok_or_else(|| "Step 1 failed".to_string())?;
    if !first_response.is_success() {
        return Err(format!("Step 1: {code}", code = first_response.status_code));
    }
    if let Some(name) = capture {
        if first_response.header(name).is_none() {
            return Err(missing_note.to_string());
        }
    }
    steps
        .get(1)
        .filter(|s| s.executed)
        .and_then(|s| s.response.as_ref())
        .ok_or_else(|| "Connection closed before conditional request".to_string())
}

fn strip_etag(etag: &str) -> &str {
    let stripped = etag.strip_prefix("W/").unwrap_or(etag);
    stripped
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(stripped)
}

fn weaken_etag(etag: &str) -> String {
    if etag.starts_with("W/") {
        etag.to_string()
    } else {
        format!("W/{etag}")
    }
}

pub fn cases() -> Vec<Case> {
    let mut cases = vec![
        Case::sequence(
            "CAP-ETAG-304",
            "ETag conditional GET returns 304 Not Modified",
            CAT,
            "304",
            vec![
                Step::fixed("Initial GET (capture ETag)", initial_get),
                Step::dynamic("Conditional GET (If-None-Match)", |t, prior| {
                    let etag = prior
                        .first()
                        .and_then(|s| s.header("ETag"))
                        .unwrap_or("\"no-etag\"");
                    conditional_get(t, "If-None-Match", etag)
                }),
            ],
            |steps| match second_response(steps, Some("ETag")) {
                Err(v) => v,
                Ok(r) if r.status_code == 304 => Verdict::Pass,
                Ok(r) if r.is_success() => Verdict::Warn,
                Ok(_) => Verdict::Fail,
            },
            |steps| {
                let note = match second_or_note(steps, Some("ETag"), "No ETag header in response")
                {
                    Err(note) => note,
                    Ok(r) => format!(
                        "ETag: {etag} → {code}",
                        etag = steps[0].header("ETag").unwrap_or_default(),
                        code = r.status_code
                    ),
                };
                Some(note)
            },
        )
        .with_rfc("RFC 9110 §13.1.2"),
        Case::sequence(
            "CAP-LAST-MODIFIED-304",
            "Last-Modified conditional GET returns 304 Not Modified",
            CAT,
            "304",
            vec![
                Step::fixed("Initial GET (capture Last-Modified)", initial_get),
                Step::dynamic("Conditional GET (If-Modified-Since)", |t, prior| {
                    let stamp = prior
                        .first()
                        .and_then(|s| s.header("Last-Modified"))
                        .unwrap_or("Thu, 01 Jan 2099 00:00:00 GMT");
                    conditional_get(t, "If-Modified-Since", stamp)
                }),
            ],
            |steps| match second_response(steps, Some("Last-Modified")) {
                Err(v) => v,
                Ok(r) if r.status_code == 304 => Verdict::Pass,
                Ok(r) if r.is_success() => Verdict::Warn,
                Ok(_) => Verdict::Fail,
            },
            |steps| {
                let note = match second_or_note(
                    steps,
                    Some("Last-Modified"),
                    "No Last-Modified header in response",
                ) {
                    Err(note) => note,
                    Ok(r) => format!(
                        "Last-Modified: {stamp} → {code}",
                        stamp = steps[0].header("Last-Modified").unwrap_or_default(),
                        code = r.status_code
                    ),
                };
                Some(note)
            },
        )
        .with_rfc("RFC 9110 §13.1.3"),
        Case::sequence(
            "CAP-ETAG-IN-304",
            "304 response includes an ETag header",
            CAT,
            "304 with ETag",
            vec![
                Step::fixed("Initial GET (capture ETag)", initial_get),
                Step::dynamic("Conditional GET (If-None-Match)", |t, prior| {
                    let etag = prior
                        .first()
                        .and_then(|s| s.header("ETag"))
                        .unwrap_or("\"no-etag\"");
                    conditional_get(t, "If-None-Match", etag)
                }),
            ],
            |steps| match second_response(steps, Some("ETag")) {
                Err(v) => v,
                Ok(r) if r.status_code != 304 => Verdict::Warn,
                Ok(r) if r.has_header("ETag") => Verdict::Pass,
                Ok(_) => Verdict::Warn,
            },
            |steps| {
                let note = match second_or_note(steps, Some("ETag"), "No ETag support") {
                    Err(note) => note,
                    Ok(r) if r.status_code != 304 => format!(
                        "Step 2 returned {code} (no conditional support)",
                        code = r.status_code
                    ),
                    Ok(r) => match r.header("ETag") {
                        Some(etag) => format!("304 includes ETag: {etag}"),
                        None => "304 response missing ETag header".to_string(),
                    },
                };
                Some(note)
            },
        )
        .with_rfc("RFC 9110 §15.4.5"),
        Case::sequence(
            "CAP-INM-PRECEDENCE",
            "If-None-Match takes precedence over If-Modified-Since",
            CAT,
            "304",
            vec![
                Step::fixed("Initial GET (capture ETag)", initial_get),
                // Epoch as If-Modified-Since: stale enough that the date
                // alone would never produce a 304.
                Step::dynamic("Conditional GET (INM + stale IMS)", |t, prior| {
                    let etag = prior
                        .first()
                        .and_then(|s| s.header("ETag"))
                        .unwrap_or("\"no-etag\"");
                    format!(
                        "GET / HTTP/1.1\r\nHost: {host}\r\nIf-None-Match: {etag}\r\n\
                         If-Modified-Since: Thu, 01 Jan 1970 00:00:00 GMT\r\n\r\n",
                        host = t.host_header()
                    )
                    .into_bytes()
                }),
            ],
            |steps| match second_response(steps, Some("ETag")) {
                Err(v) => v,
                Ok(r) if r.status_code == 304 => Verdict::Pass,
                Ok(r) if r.is_success() => Verdict::Warn,
                Ok(_) => Verdict::Fail,
            },
            |steps| {
                let note = match second_or_note(steps, Some("ETag"), "No ETag support") {
                    Err(note) => note,
                    Ok(r) if r.status_code == 304 => {
                        "If-None-Match took precedence (correct)".to_string()
                    }
                    Ok(r) if r.is_success() => {
                        "If-Modified-Since took precedence (INM ignored)".to_string()
                    }
                    Ok(r) => format!("Unexpected: {code}", code = r.status_code),
                };
                Some(note)
            },
        )
        .with_rfc("RFC 9110 §13.1.2"),
        Case::sequence(
            "CAP-INM-WILDCARD",
            "If-None-Match: * on an existing resource returns 304",
            CAT,
            "304",
            vec![
                Step::fixed("Initial GET (confirm 2xx)", initial_get),
                Step::fixed("Conditional GET (If-None-Match: *)", |t| {
                    conditional_get(t, "If-None-Match", "*")
                }),
            ],
            |steps| match second_response(steps, None) {
                Err(v) => v,
                Ok(r) if r.status_code == 304 => Verdict::Pass,
                Ok(r) if r.is_success() => Verdict::Warn,
                Ok(_) => Verdict::Fail,
            },
            |steps| {
                let note = match second_or_note(steps, None, "") {
                    Err(note) => note,
                    Ok(r) if r.status_code == 304 => {
                        "Wildcard If-None-Match recognized".to_string()
                    }
                    Ok(r) if r.is_success() => "Server ignores If-None-Match: *".to_string(),
                    Ok(r) => format!("Unexpected: {code}", code = r.status_code),
                };
                Some(note)
            },
        )
        .with_rfc("RFC 9110 §13.1.2"),
        Case::sequence(
            "CAP-IMS-FUTURE",
            "If-Modified-Since with a future date is ignored",
            CAT,
            "200",
            vec![
                Step::fixed("Initial GET (confirm 2xx)", initial_get),
                Step::fixed("Conditional GET (If-Modified-Since: future date)", |t| {
                    conditional_get(t, "If-Modified-Since", "Thu, 01 Jan 2099 00:00:00 GMT")
                }),
            ],
            |steps| match second_response(steps, None) {
                Err(v) => v,
                Ok(r) if r.is_success() => Verdict::Pass,
                Ok(r) if r.status_code == 304 => Verdict::Warn,
                Ok(_) => Verdict::Fail,
            },
            |steps| {
                let note = match second_or_note(steps, None, "") {
                    Err(note) => note,
                    Ok(r) if r.is_success() => {
                        "Correctly ignored future If-Modified-Since".to_string()
                    }
                    Ok(r) if r.status_code == 304 => {
                        "Server returned 304 for future date (didn't validate)".to_string()
                    }
                    Ok(r) => format!("Unexpected: {code}", code = r.status_code),
                };
                Some(note)
            },
        )
        .with_rfc("RFC 9110 §13.1.3"),
        Case::sequence(
            "CAP-IMS-INVALID",
            "If-Modified-Since with a garbage date is ignored",
            CAT,
            "200",
            vec![
                Step::fixed("Initial GET (confirm 2xx)", initial_get),
                Step::fixed("Conditional GET (If-Modified-Since: garbage)", |t| {
                    conditional_get(t, "If-Modified-Since", "not-a-date")
                }),
            ],
            |steps| match second_response(steps, None) {
                Err(v) => v,
                Ok(r) if r.is_success() => Verdict::Pass,
                Ok(r) if r.status_code == 304 => Verdict::Warn,
                Ok(_) => Verdict::Fail,
            },
            |steps| {
                let note = match second_or_note(steps, None, "") {
                    Err(note) => note,
                    Ok(r) if r.is_success() => {
                        "Correctly ignored invalid If-Modified-Since".to_string()
                    }
                    Ok(r) if r.status_code == 304 => {
                        "Server returned 304 for garbage date (treated as valid)".to_string()
                    }
                    Ok(r) => format!("Unexpected: {code}", code = r.status_code),
                };
                Some(note)
            },
        )
        .with_rfc("RFC 9110 §13.1.3"),
        Case::sequence(
            "CAP-INM-UNQUOTED",
            "If-None-Match with an unquoted ETag",
            CAT,
            "200",
            vec![
                Step::fixed("Initial GET (capture ETag)", initial_get),
                Step::dynamic("Conditional GET (If-None-Match: unquoted)", |t, prior| {
                    let value = match prior.first().and_then(|s| s.header("ETag")) {
                        Some(etag) => strip_etag(etag).to_string(),
                        None => "no-etag".to_string(),
                    };
                    conditional_get(t, "If-None-Match", &value)
                }),
            ],
            |steps| match second_response(steps, Some("ETag")) {
                Err(v) => v,
                Ok(r) if r.is_success() => Verdict::Pass,
                Ok(r) if r.status_code == 304 => Verdict::Warn,
                Ok(_) => Verdict::Fail,
            },
            |steps| {
                let note = match second_or_note(steps, Some("ETag"), "No ETag support") {
                    Err(note) => note,
                    Ok(r) if r.is_success() => "Correctly rejected unquoted ETag syntax".to_string(),
                    Ok(r) if r.status_code == 304 => {
                        "Accepted unquoted ETag (lenient parsing)".to_string()
                    }
                    Ok(r) => format!("Unexpected: {code}", code = r.status_code),
                };
                Some(note)
            },
        )
        .with_rfc("RFC 9110 §8.8.3"),
        Case::sequence(
            "CAP-ETAG-WEAK",
            "Weak ETag comparison for GET",
            CAT,
            "304",
            vec![
                Step::fixed("Initial GET (capture ETag)", initial_get),
                Step::dynamic("Conditional GET (If-None-Match: W/etag)", |t, prior| {
                    let value = match prior.first().and_then(|s| s.header("ETag")) {
                        Some(etag) => weaken_etag(etag),
                        None => "W/\"no-etag\"".to_string(),
                    };
                    conditional_get(t, "If-None-Match", &value)
                }),
            ],
            |steps| match second_response(steps, Some("ETag")) {
                Err(v) => v,
                Ok(r) if r.status_code == 304 => Verdict::Pass,
                Ok(r) if r.is_success() => Verdict::Warn,
                Ok(_) => Verdict::Fail,
            },
            |steps| {
                let note = match second_or_note(steps, Some("ETag"), "No ETag support") {
                    Err(note) => note,
                    Ok(r) => {
                        let weak = steps[0]
                            .header("ETag")
                            .map(weaken_etag)
                            .unwrap_or_default();
                        if r.status_code == 304 {
                            format!("Weak comparison matched: {weak} → 304")
                        } else if r.is_success() {
                            format!(
                                "Weak comparison not matched: {weak} → {code}",
                                code = r.status_code
                            )
                        } else {
                            format!("Unexpected: {code}", code = r.status_code)
                        }
                    }
                };
                Some(note)
            },
        )
        .with_rfc("RFC 9110 §13.1.2"),
    ];
    for case in &mut cases {
        case.scored = false;
        case.rfc_level = RfcLevel::Should;
    }
    cases
}
