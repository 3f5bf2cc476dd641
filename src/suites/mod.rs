//! Built-in probe suites.
//!
//! Each suite is a flat list of [`Case`]s. IDs are stable and referenced in
//! reports, so treat them as part of the public surface.

pub mod capabilities;
pub mod compliance;
pub mod malformed;
pub mod normalization;
pub mod smuggling;

mod tests;

use crate::cases::{Case, Expectation, Verdict};
use crate::client::ConnectionState;

/// All suites in registration order.
pub fn all() -> Vec<Case> {
    let mut cases = compliance::cases();
    cases.extend(smuggling::cases());
    cases.extend(malformed::cases());
    cases.extend(normalization::cases());
    cases.extend(capabilities::cases());
    cases
}

fn label_for(codes: &[u16], suffix: &str) -> String {
    let mut label = codes
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join("/");
    label.push_str(suffix);
    label
}

/// One of `codes`, a connection close, or a read timeout all pass. Used for
/// payloads a server may legitimately sit on waiting for more bytes.
pub(crate) fn reject_close_or_timeout(codes: &'static [u16]) -> Expectation {
    Expectation::custom(label_for(codes, "/close"), move |response, state| {
        if matches!(
            state,
            ConnectionState::TimedOut | ConnectionState::ClosedByServer
        ) {
            return Verdict::Pass;
        }
        match response {
            Some(r) if codes.contains(&r.status_code) => Verdict::Pass,
            _ => Verdict::Fail,
        }
    })
}

/// One of `codes` passes; any other response is a warning rather than a
/// failure, because accepting the payload is RFC-tolerable but noteworthy.
pub(crate) fn reject_or_warn(codes: &'static [u16]) -> Expectation {
    Expectation::custom(label_for(codes, "/close"), move |response, state| {
        match response {
            Some(r) if codes.contains(&r.status_code) => Verdict::Pass,
            Some(_) => Verdict::Warn,
            None if state == ConnectionState::ClosedByServer => Verdict::Pass,
            None => Verdict::Fail,
        }
    })
}

/// Anything but a 101 protocol switch passes.
pub(crate) fn no_switch() -> Expectation {
    Expectation::custom("not 101", |response, state| match response {
        Some(r) if r.status_code == 101 => Verdict::Fail,
        Some(_) => Verdict::Pass,
        None if state == ConnectionState::ClosedByServer => Verdict::Pass,
        None => Verdict::Fail,
    })
}

/// For prohibited trailer fields: rejection passes, a 2xx that ignored the
/// trailer is a warning, anything else fails.
pub(crate) fn trailer_ignored() -> Expectation {
    Expectation::custom("400/close", |response, state| match response {
        Some(r) if r.status_code == 400 => Verdict::Pass,
        Some(r) if r.is_success() => Verdict::Warn,
        Some(_) => Verdict::Fail,
        None if state == ConnectionState::ClosedByServer => Verdict::Pass,
        None => Verdict::Fail,
    })
}
