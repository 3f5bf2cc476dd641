//! Expected server behavior for a probe case.

use crate::cases::Verdict;
use crate::client::ConnectionState;
use crate::response::HttpResponse;

/// A custom verdict function over the parsed response and connection state.
pub type ValidatorFn =
    Box<dyn Fn(Option<&HttpResponse>, ConnectionState) -> Verdict + Send + Sync>;

enum Kind {
    Status {
        /// Exact status codes that pass. Empty means "any 2xx".
        accept: Vec<u16>,
        allow_close: bool,
    },
    Custom(ValidatorFn),
}

/// What the server is expected to do with a payload.
///
/// Most cases expect a specific rejection status (optionally accepting a
/// plain connection close instead); anything more nuanced is expressed as a
/// custom validator.
pub struct Expectation {
    label: String,
    kind: Kind,
}

impl Expectation {
    /// Expect any 2xx status.
    pub fn success() -> Self {
        Self {
            label: "2xx".to_string(),
            kind: Kind::Status {
                accept: Vec::new(),
                allow_close: false,
            },
        }
    }

    /// Expect one exact status code.
    pub fn status(code: u16) -> Self {
        Self {
            label: code.to_string(),
            kind: Kind::Status {
                accept: vec![code],
                allow_close: false,
            },
        }
    }

    /// Expect one of several status codes.
    pub fn any_of(codes: &[u16]) -> Self {
        let label = codes
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join("/");
        Self {
            label,
            kind: Kind::Status {
                accept: codes.to_vec(),
                allow_close: false,
            },
        }
    }

    /// Also accept the server closing the connection without a response.
    pub fn or_close(mut self) -> Self {
        if let Kind::Status { allow_close, .. } = &mut self.kind {
            *allow_close = true;
        }
        self.label.push_str("/close");
        self
    }

    /// Expect behavior described by a custom validator.
    pub fn custom(
        label: impl Into<String>,
        validator: impl Fn(Option<&HttpResponse>, ConnectionState) -> Verdict + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            kind: Kind::Custom(Box::new(validator)),
        }
    }

    /// The short label shown in reports, e.g. "400/close" or "2xx".
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Grade the observed response and connection state.
    pub fn evaluate(&self, response: Option<&HttpResponse>, state: ConnectionState) -> Verdict {
        match &self.kind {
            Kind::Custom(validator) => validator(response, state),
            Kind::Status {
                accept,
                allow_close,
            } => match response {
                Some(r) => {
                    let hit = if accept.is_empty() {
                        r.is_success()
                    } else {
                        accept.contains(&r.status_code)
                    };
                    if hit {
                        Verdict::Pass
                    } else {
                        Verdict::Fail
                    }
                }
                None => match state {
                    ConnectionState::ClosedByServer if *allow_close => Verdict::Pass,
                    ConnectionState::ClosedByServer => Verdict::Fail,
                    // No response and no close: we cannot grade the server.
                    _ => Verdict::Error,
                },
            },
        }
    }
}
