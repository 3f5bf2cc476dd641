//! Probe execution.
//!
//! The runner connects to the target once per case, delivers the payload,
//! grades whatever comes back, and collects everything into a [`Report`].
//! Failures to connect or read are verdicts, not errors: a server that
//! drops the connection mid-probe is itself a data point.

mod tests;

use std::time::Duration;

use log::{debug, info};
use tokio::time::Instant;

use crate::cases::{
    Case, CaseKind, Category, Expectation, PayloadFn, RfcLevel, SequenceAnalyzerFn,
    SequenceValidatorFn, Step, StepPayload, StepResult, Target, Verdict,
};
use crate::client::{ConnectionState, Error as ClientError, RawClient};
use crate::response::{parse_response, truncate_chars, HttpResponse};

/// Maximum characters of raw request/response kept per result.
const RAW_CAP: usize = 8192;

/// Grace period before re-checking whether the server closed after
/// responding.
const CLOSE_CHECK_DELAY: Duration = Duration::from_millis(50);

/// Options for a probe run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Only run cases in this category.
    pub category: Option<Category>,
    /// Only run cases whose id matches one of these (case-insensitive).
    pub ids: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
            category: None,
            ids: Vec::new(),
        }
    }
}

/// The outcome of one case.
#[derive(Debug)]
pub struct CaseResult {
    pub id: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub rfc_reference: Option<&'static str>,
    pub rfc_level: RfcLevel,
    pub scored: bool,
    pub expected: String,
    pub verdict: Verdict,
    pub status_code: Option<u16>,
    pub state: Option<ConnectionState>,
    pub error: Option<String>,
    pub duration: Duration,
    pub raw_request: String,
    pub raw_response: String,
    pub note: Option<String>,
    /// True if response bytes arrived only in the post-response drain.
    pub drain_caught_data: bool,
}

impl CaseResult {
    fn base(case: &Case) -> Self {
        Self {
            id: case.id,
            description: case.description,
            category: case.category,
            rfc_reference: case.rfc_reference,
            rfc_level: case.rfc_level,
            scored: case.scored,
            expected: case.expected_label().to_string(),
            verdict: Verdict::Error,
            status_code: None,
            state: None,
            error: None,
            duration: Duration::ZERO,
            raw_request: String::new(),
            raw_response: String::new(),
            note: None,
            drain_caught_data: false,
        }
    }

    fn skipped(case: &Case) -> Self {
        let mut result = Self::base(case);
        result.verdict = Verdict::Skip;
        result
    }

    fn errored(case: &Case, state: ConnectionState, error: &ClientError) -> Self {
        let mut result = Self::base(case);
        result.verdict = Verdict::Error;
        result.state = Some(state);
        result.error = Some(error.to_string());
        result
    }
}

/// A finished probe run.
#[derive(Debug)]
pub struct Report {
    pub results: Vec<CaseResult>,
    pub duration: Duration,
}

impl Report {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of scored cases that actually ran.
    pub fn scored(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.scored && r.verdict != Verdict::Skip)
            .count()
    }

    pub fn passed(&self) -> usize {
        self.count_scored(Verdict::Pass)
    }

    pub fn failed(&self) -> usize {
        self.count_scored(Verdict::Fail)
    }

    pub fn warnings(&self) -> usize {
        self.count_scored(Verdict::Warn)
    }

    pub fn errors(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.verdict == Verdict::Error)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.verdict == Verdict::Skip)
            .count()
    }

    /// Number of unscored cases that actually ran.
    pub fn unscored(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.scored && r.verdict != Verdict::Skip)
            .count()
    }

    fn count_scored(&self, verdict: Verdict) -> usize {
        self.results
            .iter()
            .filter(|r| r.scored && r.verdict == verdict)
            .count()
    }
}

/// Executes probe cases against a target.
pub struct Runner {
    options: RunOptions,
}

impl Runner {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Run all cases in order. `on_result` is called as each case finishes.
    pub async fn run<F>(&self, cases: Vec<Case>, mut on_result: F) -> Report
    where
        F: FnMut(&CaseResult),
    {
        let target = Target::new(self.options.host.clone(), self.options.port);
        let started = Instant::now();
        let mut results = Vec::with_capacity(cases.len());

        info!(
            "Probing {host}:{port} with {n} cases",
            host = target.host,
            port = target.port,
            n = cases.len()
        );

        for case in &cases {
            let result = if self.filtered_out(case) {
                CaseResult::skipped(case)
            } else {
                debug!("Running {id}", id = case.id);
                match &case.kind {
                    CaseKind::Single {
                        payload,
                        follow_up,
                        expected,
                        ..
                    } => {
                        self.run_single(&target, case, payload, follow_up.as_ref(), expected)
                            .await
                    }
                    CaseKind::Sequence {
                        steps,
                        validator,
                        analyzer,
                        ..
                    } => {
                        self.run_sequence(&target, case, steps, validator, analyzer.as_ref())
                            .await
                    }
                }
            };
            on_result(&result);
            results.push(result);
        }

        Report {
            results,
            duration: started.elapsed(),
        }
    }

    fn filtered_out(&self, case: &Case) -> bool {
        if let Some(category) = self.options.category {
            if case.category != category {
                return true;
            }
        }
        if !self.options.ids.is_empty()
            && !self
                .options
                .ids
                .iter()
                .any(|id| id.eq_ignore_ascii_case(case.id))
        {
            return true;
        }
        false
    }

    async fn connect(&self, target: &Target) -> Result<RawClient, ClientError> {
        RawClient::connect(
            &target.host,
            target.port,
            self.options.connect_timeout,
            self.options.read_timeout,
        )
        .await
    }

    async fn run_single(
        &self,
        target: &Target,
        case: &Case,
        payload: &PayloadFn,
        follow_up: Option<&PayloadFn>,
        expected: &Expectation,
    ) -> CaseResult {
        let started = Instant::now();
        let payload = payload(target);

        let mut result = CaseResult::base(case);
        result.raw_request = printable(&payload);

        let mut client = match self.connect(target).await {
            Ok(client) => client,
            Err(e) => {
                let state = connect_error_state(&e);
                let mut result = CaseResult::errored(case, state, &e);
                result.raw_request = printable(&payload);
                result.duration = started.elapsed();
                return result;
            }
        };

        if let Err(e) = client.send(&payload).await {
            let mut result = CaseResult::errored(case, ConnectionState::Error, &e);
            result.raw_request = printable(&payload);
            result.duration = started.elapsed();
            return result;
        }

        let outcome = client.read_response().await;
        let response = parse_response(&outcome.data).ok();
        result.raw_response = printable(&outcome.data);
        result.drain_caught_data = outcome.drain_caught_data;

        let mut state = outcome.state;
        if state == ConnectionState::Open {
            // Some servers answer first and close a moment later; both the
            // verdict and the follow-up decision depend on which it was.
            tokio::time::sleep(CLOSE_CHECK_DELAY).await;
            state = client.check_state().await;
        }

        if let Some(follow_up) = follow_up {
            if state == ConnectionState::Open {
                self.send_follow_up(&mut client, target, follow_up, &mut result)
                    .await;
            }
        }

        result.verdict = expected.evaluate(response.as_ref(), state);
        result.status_code = response.as_ref().map(|r| r.status_code);
        result.state = Some(state);
        result.note = analyze(case, response.as_ref());
        result.duration = started.elapsed();
        result
    }

    /// Send the pipelined follow-up request and capture its reply. The
    /// verdict comes from the first exchange; this is forensic material.
    async fn send_follow_up(
        &self,
        client: &mut RawClient,
        target: &Target,
        follow_up: &PayloadFn,
        result: &mut CaseResult,
    ) {
        let payload = follow_up(target);
        append_section(&mut result.raw_request, "follow-up", &printable(&payload));
        if client.send(&payload).await.is_err() {
            return;
        }
        let outcome = client.read_response().await;
        append_section(
            &mut result.raw_response,
            "follow-up",
            &printable(&outcome.data),
        );
        if outcome.drain_caught_data {
            result.drain_caught_data = true;
        }
    }

    async fn run_sequence(
        &self,
        target: &Target,
        case: &Case,
        steps: &[Step],
        validator: &SequenceValidatorFn,
        analyzer: Option<&SequenceAnalyzerFn>,
    ) -> CaseResult {
        let started = Instant::now();
        let mut result = CaseResult::base(case);

        let mut client = match self.connect(target).await {
            Ok(client) => client,
            Err(e) => {
                let mut result = CaseResult::errored(case, connect_error_state(&e), &e);
                result.duration = started.elapsed();
                return result;
            }
        };

        let mut step_results: Vec<StepResult> = Vec::with_capacity(steps.len());
        let mut open = true;

        for step in steps {
            if !open {
                step_results.push(StepResult {
                    label: step.label,
                    request: String::new(),
                    response: None,
                    state: ConnectionState::ClosedByServer,
                    executed: false,
                });
                continue;
            }

            let (request, send_ok) = self
                .send_step(&mut client, target, step, &step_results)
                .await;
            if !send_ok {
                open = false;
                step_results.push(StepResult {
                    label: step.label,
                    request,
                    response: None,
                    state: ConnectionState::ClosedByServer,
                    executed: false,
                });
                continue;
            }

            let outcome = client.read_response().await;
            let response = parse_response(&outcome.data).ok();
            let mut state = outcome.state;
            if state == ConnectionState::Open {
                tokio::time::sleep(CLOSE_CHECK_DELAY).await;
                state = client.check_state().await;
            }
            if state != ConnectionState::Open {
                open = false;
            }
            if outcome.drain_caught_data {
                result.drain_caught_data = true;
            }

            step_results.push(StepResult {
                label: step.label,
                request,
                response,
                state,
                executed: true,
            });
        }

        result.verdict = validator(&step_results);
        result.note = analyzer.and_then(|f| f(&step_results));
        result.status_code = step_results
            .iter()
            .rev()
            .find_map(|s| s.response.as_ref().map(|r| r.status_code));
        result.state = step_results.last().map(|s| s.state);

        for step in &step_results {
            append_section(&mut result.raw_request, step.label, &step.request);
            let response_text = step
                .response
                .as_ref()
                .map(|r| r.raw.clone())
                .unwrap_or_default();
            append_section(&mut result.raw_response, step.label, &response_text);
        }
        result.raw_request = truncate_chars(&result.raw_request, RAW_CAP);
        result.raw_response = truncate_chars(&result.raw_response, RAW_CAP);

        result.duration = started.elapsed();
        result
    }

    /// Send one step's payload. Returns the request text and whether the
    /// send completed with the connection still alive.
    async fn send_step(
        &self,
        client: &mut RawClient,
        target: &Target,
        step: &Step,
        previous: &[StepResult],
    ) -> (String, bool) {
        match &step.payload {
            StepPayload::Fixed(f) => {
                let payload = f(target);
                let text = printable(&payload);
                (text, client.send(&payload).await.is_ok())
            }
            StepPayload::Dynamic(f) => {
                let payload = f(target, previous);
                let text = printable(&payload);
                (text, client.send(&payload).await.is_ok())
            }
            StepPayload::Parts(f) => {
                let parts = f(target);
                let mut text = String::new();
                for part in parts {
                    text.push_str(&printable(&part.bytes));
                    if client.send(&part.bytes).await.is_err() {
                        return (text, false);
                    }
                    if !part.delay_after.is_zero() {
                        tokio::time::sleep(part.delay_after).await;
                        // A server may slam the connection mid-pause.
                        if client.check_state().await != ConnectionState::Open {
                            return (text, false);
                        }
                    }
                }
                (text, true)
            }
        }
    }
}

fn analyze(case: &Case, response: Option<&HttpResponse>) -> Option<String> {
    match &case.kind {
        CaseKind::Single {
            analyzer: Some(analyzer),
            ..
        } => analyzer(response),
        _ => None,
    }
}

/// Connection state to record for a failed connect.
fn connect_error_state(error: &ClientError) -> ConnectionState {
    match error {
        ClientError::ConnectTimeout => ConnectionState::TimedOut,
        _ => ConnectionState::Error,
    }
}

fn printable(bytes: &[u8]) -> String {
    truncate_chars(&String::from_utf8_lossy(bytes), RAW_CAP)
}

fn append_section(buf: &mut String, label: &str, text: &str) {
    if !buf.is_empty() {
        buf.push('\n');
    }
    buf.push_str(&format!("── {label} ──\n"));
    buf.push_str(text);
}
