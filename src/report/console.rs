//! Console report output.

use crate::cases::Verdict;
use crate::runner::{CaseResult, Report};

const RESET: &str = "\x1b[0m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const DIM: &str = "\x1b[2m";

const ID_WIDTH: usize = 36;
const VERDICT_WIDTH: usize = 7;
const EXPECTED_WIDTH: usize = 16;
const STATUS_WIDTH: usize = 8;
const DETAIL_WIDTH: usize = 48;

/// Print the column header row.
pub fn print_header() {
    println!(
        "{id:<ID_WIDTH$} {verdict:<VERDICT_WIDTH$} {expected:<EXPECTED_WIDTH$} {status:<STATUS_WIDTH$} Details",
        id = "Test ID",
        verdict = "Verdict",
        expected = "Expected",
        status = "Status",
    );
    println!(
        "{}",
        "─".repeat(ID_WIDTH + VERDICT_WIDTH + EXPECTED_WIDTH + STATUS_WIDTH + DETAIL_WIDTH)
    );
}

/// Print one result row. Unscored cases are marked with `*`.
pub fn print_result(result: &CaseResult, verbose: bool) {
    let color = verdict_color(result.verdict);
    let mut tag = result.verdict.to_string();
    if !result.scored {
        tag.push('*');
    }

    let status = match result.status_code {
        Some(code) => code.to_string(),
        None => result
            .state
            .map(|s| s.to_string())
            .unwrap_or_else(|| "—".to_string()),
    };

    let detail = result
        .error
        .as_deref()
        .or(result.note.as_deref())
        .unwrap_or(result.description);

    println!(
        "{id:<ID_WIDTH$} {color}{tag:<VERDICT_WIDTH$}{RESET} {expected:<EXPECTED_WIDTH$} {status:<STATUS_WIDTH$} {detail}",
        id = truncate(result.id, ID_WIDTH),
        expected = truncate(&result.expected, EXPECTED_WIDTH),
        status = truncate(&status, STATUS_WIDTH),
        detail = truncate(detail, DETAIL_WIDTH),
    );

    if verbose && !result.raw_response.is_empty() {
        println!("{DIM}{raw}{RESET}", raw = result.raw_response.trim_end());
    }
}

/// Print the summary score line.
pub fn print_summary(report: &Report) {
    println!();
    println!(
        "Score: {passed}/{scored} passed, {failed} failed, {warnings} warnings, \
         {errors} errors, {unscored} unscored, {skipped} skipped \
         ({total} cases, {secs:.1}s)",
        passed = report.passed(),
        scored = report.scored(),
        failed = report.failed(),
        warnings = report.warnings(),
        errors = report.errors(),
        unscored = report.unscored(),
        skipped = report.skipped(),
        total = report.total(),
        secs = report.duration.as_secs_f64(),
    );
}

fn verdict_color(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => GREEN,
        Verdict::Fail => RED,
        Verdict::Warn => YELLOW,
        Verdict::Skip => DIM,
        Verdict::Error => MAGENTA,
    }
}

/// Truncate to `max` characters, appending `…` when shortened.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
