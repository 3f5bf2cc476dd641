//! Probe case model.
//!
//! A [`Case`] pairs a payload (the exact bytes to put on the wire) with an
//! [`Expectation`] describing what a well-behaved server does with it. Most
//! cases are a single request/response exchange; capability checks and
//! timing-sensitive smuggling probes are sequences of steps over one
//! connection.

mod expect;
mod tests;

pub use expect::{Expectation, ValidatorFn};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::client::ConnectionState;
use crate::response::HttpResponse;

/// The server under test.
#[derive(Debug, Clone)]
pub struct Target {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The value to send in a Host header. Port 80 is implied and omitted.
    pub fn host_header(&self) -> String {
        if self.port == 80 {
            self.host.clone()
        } else {
            format!("{host}:{port}", host = self.host, port = self.port)
        }
    }
}

/// Probe case categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Compliance,
    Smuggling,
    MalformedInput,
    Normalization,
    Capabilities,
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compliance" => Ok(Category::Compliance),
            "smuggling" => Ok(Category::Smuggling),
            "malformed-input" | "malformed" => Ok(Category::MalformedInput),
            "normalization" => Ok(Category::Normalization),
            "capabilities" => Ok(Category::Capabilities),
            _ => Err(format!("Unknown category: {s}")),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Compliance => "compliance",
            Category::Smuggling => "smuggling",
            Category::MalformedInput => "malformed-input",
            Category::Normalization => "normalization",
            Category::Capabilities => "capabilities",
        };
        write!(f, "{s}")
    }
}

/// How strongly the RFC mandates the expected behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RfcLevel {
    Must,
    Should,
    May,
    NotApplicable,
}

/// The grade assigned to a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Pass,
    Fail,
    Warn,
    Skip,
    Error,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::Warn => "WARN",
            Verdict::Skip => "SKIP",
            Verdict::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

/// Produces the bytes to send for a target.
pub type PayloadFn = Box<dyn Fn(&Target) -> Vec<u8> + Send + Sync>;

/// Produces an optional human note from the parsed response.
pub type AnalyzerFn = Box<dyn Fn(Option<&HttpResponse>) -> Option<String> + Send + Sync>;

/// Maps the results of all sequence steps to a verdict.
pub type SequenceValidatorFn = Box<dyn Fn(&[StepResult]) -> Verdict + Send + Sync>;

/// Produces an optional human note from the sequence step results.
pub type SequenceAnalyzerFn = Box<dyn Fn(&[StepResult]) -> Option<String> + Send + Sync>;

/// One part of a multi-part send, with an optional pause after it.
pub struct SendPart {
    pub bytes: Vec<u8>,
    pub delay_after: Duration,
}

/// The payload of a sequence step.
pub enum StepPayload {
    /// Fixed bytes.
    Fixed(PayloadFn),
    /// Bytes computed from the results of earlier steps, e.g. a conditional
    /// request echoing a captured ETag.
    Dynamic(Box<dyn Fn(&Target, &[StepResult]) -> Vec<u8> + Send + Sync>),
    /// Several sends separated by deliberate pauses.
    Parts(Box<dyn Fn(&Target) -> Vec<SendPart> + Send + Sync>),
}

/// One step of a sequence case.
pub struct Step {
    pub label: &'static str,
    pub payload: StepPayload,
}

impl Step {
    pub fn fixed(
        label: &'static str,
        payload: impl Fn(&Target) -> Vec<u8> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label,
            payload: StepPayload::Fixed(Box::new(payload)),
        }
    }

    pub fn dynamic(
        label: &'static str,
        payload: impl Fn(&Target, &[StepResult]) -> Vec<u8> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label,
            payload: StepPayload::Dynamic(Box::new(payload)),
        }
    }

    pub fn parts(
        label: &'static str,
        payload: impl Fn(&Target) -> Vec<SendPart> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label,
            payload: StepPayload::Parts(Box::new(payload)),
        }
    }
}

/// The outcome of one executed (or skipped) sequence step.
#[derive(Debug)]
pub struct StepResult {
    pub label: &'static str,
    /// The request text as sent, lossily decoded.
    pub request: String,
    /// The parsed response, if one arrived and parsed.
    pub response: Option<HttpResponse>,
    /// Connection state after the step.
    pub state: ConnectionState,
    /// False if the step never ran because the connection was already gone.
    pub executed: bool,
}

impl StepResult {
    /// Get a response header from this step by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.response.as_ref().and_then(|r| r.header(name))
    }
}

/// The exchange shape of a case.
pub enum CaseKind {
    Single {
        payload: PayloadFn,
        /// An extra pipelined request sent after the response if the
        /// connection survived. Its reply is captured for inspection only.
        follow_up: Option<PayloadFn>,
        expected: Expectation,
        analyzer: Option<AnalyzerFn>,
    },
    Sequence {
        steps: Vec<Step>,
        /// Short label for the "expected" column, e.g. "304".
        expected: String,
        validator: SequenceValidatorFn,
        analyzer: Option<SequenceAnalyzerFn>,
    },
}

/// A single probe case.
pub struct Case {
    pub id: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub rfc_reference: Option<&'static str>,
    pub rfc_level: RfcLevel,
    /// Scored cases count toward the pass/fail score; unscored cases are
    /// informational.
    pub scored: bool,
    pub kind: CaseKind,
}

impl Case {
    /// A single request/response case.
    pub fn single(
        id: &'static str,
        description: &'static str,
        category: Category,
        payload: impl Fn(&Target) -> Vec<u8> + Send + Sync + 'static,
        expected: Expectation,
    ) -> Self {
        Self {
            id,
            description,
            category,
            rfc_reference: None,
            rfc_level: RfcLevel::Must,
            scored: true,
            kind: CaseKind::Single {
                payload: Box::new(payload),
                follow_up: None,
                expected,
                analyzer: None,
            },
        }
    }

    /// A multi-step case over one connection.
    pub fn sequence(
        id: &'static str,
        description: &'static str,
        category: Category,
        expected: impl Into<String>,
        steps: Vec<Step>,
        validator: impl Fn(&[StepResult]) -> Verdict + Send + Sync + 'static,
        analyzer: impl Fn(&[StepResult]) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            description,
            category,
            rfc_reference: None,
            rfc_level: RfcLevel::Must,
            scored: true,
            kind: CaseKind::Sequence {
                steps,
                expected: expected.into(),
                validator: Box::new(validator),
                analyzer: Some(Box::new(analyzer)),
            },
        }
    }

    pub fn with_rfc(mut self, reference: &'static str) -> Self {
        self.rfc_reference = Some(reference);
        self
    }

    pub fn with_level(mut self, level: RfcLevel) -> Self {
        self.rfc_level = level;
        self
    }

    pub fn unscored(mut self) -> Self {
        self.scored = false;
        self
    }

    /// Attach a behavioral analyzer. Only meaningful for single cases.
    pub fn with_analyzer(
        mut self,
        f: impl Fn(Option<&HttpResponse>) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        if let CaseKind::Single { analyzer, .. } = &mut self.kind {
            *analyzer = Some(Box::new(f));
        }
        self
    }

    /// Attach a pipelined follow-up request. Only meaningful for single cases.
    pub fn with_follow_up(
        mut self,
        f: impl Fn(&Target) -> Vec<u8> + Send + Sync + 'static,
    ) -> Self {
        if let CaseKind::Single { follow_up, .. } = &mut self.kind {
            *follow_up = Some(Box::new(f));
        }
        self
    }

    /// The label shown in the "expected" column of reports.
    pub fn expected_label(&self) -> &str {
        match &self.kind {
            CaseKind::Single { expected, .. } => expected.label(),
            CaseKind::Sequence { expected, .. } => expected,
        }
    }
}
