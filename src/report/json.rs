//! JSON report output.

use serde::Serialize;

use crate::cases::{Category, RfcLevel, Verdict};
use crate::client::ConnectionState;
use crate::runner::{CaseResult, Report};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport {
    summary: JsonSummary,
    results: Vec<JsonResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary {
    total: usize,
    scored: usize,
    passed: usize,
    failed: usize,
    warnings: usize,
    errors: usize,
    skipped: usize,
    duration_ms: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonResult {
    id: &'static str,
    description: &'static str,
    category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    rfc_reference: Option<&'static str>,
    scored: bool,
    rfc_level: RfcLevel,
    expected: String,
    verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    connection_state: Option<ConnectionState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    duration_ms: u64,
    raw_request: String,
    raw_response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    behavioral_note: Option<String>,
    double_flush: bool,
}

impl From<&CaseResult> for JsonResult {
    fn from(r: &CaseResult) -> Self {
        Self {
            id: r.id,
            description: r.description,
            category: r.category,
            rfc_reference: r.rfc_reference,
            scored: r.scored,
            rfc_level: r.rfc_level,
            expected: r.expected.clone(),
            verdict: r.verdict,
            status_code: r.status_code,
            connection_state: r.state,
            error: r.error.clone(),
            duration_ms: r.duration.as_millis() as u64,
            raw_request: r.raw_request.clone(),
            raw_response: r.raw_response.clone(),
            behavioral_note: r.note.clone(),
            double_flush: r.drain_caught_data,
        }
    }
}

/// Render a run report as pretty-printed JSON.
pub fn render_json(report: &Report) -> serde_json::Result<String> {
    let doc = JsonReport {
        summary: JsonSummary {
            total: report.total(),
            scored: report.scored(),
            passed: report.passed(),
            failed: report.failed(),
            warnings: report.warnings(),
            errors: report.errors(),
            skipped: report.skipped(),
            duration_ms: report.duration.as_millis() as u64,
        },
        results: report.results.iter().map(JsonResult::from).collect(),
    };
    serde_json::to_string_pretty(&doc)
}
