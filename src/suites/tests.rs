//! Tests for the built-in suites.

#[cfg(test)]
mod tests {
    use crate::cases::{Case, CaseKind, Category, Expectation, StepResult, Target, Verdict};
    use crate::client::ConnectionState;
    use crate::response::{parse_response, HttpResponse};
    use crate::suites;

    fn target() -> Target {
        Target::new("localhost", 8080)
    }

    fn find(id: &str) -> Case {
        suites::all()
            .into_iter()
            .find(|c| c.id == id)
            .unwrap_or_else(|| panic!("no case {id}"))
    }

    fn payload_of(case: &Case) -> Vec<u8> {
        match &case.kind {
            CaseKind::Single { payload, .. } => payload(&target()),
            CaseKind::Sequence { .. } => panic!("{} is a sequence case", case.id),
        }
    }

    fn expectation_of(case: &Case) -> &Expectation {
        match &case.kind {
            CaseKind::Single { expected, .. } => expected,
            CaseKind::Sequence { .. } => panic!("{} is a sequence case", case.id),
        }
    }

    fn response(raw: &str) -> HttpResponse {
        parse_response(raw.as_bytes()).unwrap()
    }

    fn step(response: Option<HttpResponse>, state: ConnectionState, executed: bool) -> StepResult {
        StepResult {
            label: "step",
            request: String::new(),
            response,
            state,
            executed,
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let cases = suites::all();
        let mut ids: Vec<&str> = cases.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(before, ids.len());
    }

    #[test]
    fn test_suite_categories_are_homogeneous() {
        for (cases, category) in [
            (suites::compliance::cases(), Category::Compliance),
            (suites::smuggling::cases(), Category::Smuggling),
            (suites::malformed::cases(), Category::MalformedInput),
            (suites::normalization::cases(), Category::Normalization),
            (suites::capabilities::cases(), Category::Capabilities),
        ] {
            assert!(!cases.is_empty());
            for case in &cases {
                assert_eq!(case.category, category, "{}", case.id);
            }
        }
    }

    #[test]
    fn test_capability_cases_are_informational() {
        for case in suites::capabilities::cases() {
            assert!(!case.scored, "{}", case.id);
            assert!(matches!(case.kind, CaseKind::Sequence { .. }), "{}", case.id);
        }
    }

    #[test]
    fn test_baseline_payload_and_expectation() {
        let case = find("COMP-BASELINE");
        let payload = payload_of(&case);
        assert_eq!(
            payload,
            b"GET / HTTP/1.1\r\nHost: localhost:8080\r\n\r\n".to_vec()
        );

        let expected = expectation_of(&case);
        let ok = response("HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nOK");
        assert_eq!(
            expected.evaluate(Some(&ok), ConnectionState::Open),
            Verdict::Pass
        );
        assert_eq!(
            expected.evaluate(None, ConnectionState::ClosedByServer),
            Verdict::Fail
        );
    }

    #[test]
    fn test_bare_lf_payload_has_no_cr() {
        let payload = payload_of(&find("RFC9112-2.2-BARE-LF-REQUEST-LINE"));
        let text = String::from_utf8(payload).unwrap();
        assert!(text.starts_with("GET / HTTP/1.1\nHost:"));
    }

    #[test]
    fn test_ambiguous_framing_close_passes() {
        let case = find("SMUG-CL-TE-BOTH");
        let expected = expectation_of(&case);
        assert_eq!(
            expected.evaluate(None, ConnectionState::ClosedByServer),
            Verdict::Pass
        );
        let accepted = response("HTTP/1.1 200 OK\r\n\r\n");
        assert_eq!(
            expected.evaluate(Some(&accepted), ConnectionState::Open),
            Verdict::Fail
        );
    }

    #[test]
    fn test_clte_pipeline_has_follow_up() {
        let case = find("SMUG-CLTE-PIPELINE");
        match &case.kind {
            CaseKind::Single { follow_up, .. } => assert!(follow_up.is_some()),
            CaseKind::Sequence { .. } => panic!("expected a single case"),
        }
    }

    #[test]
    fn test_binary_garbage_is_deterministic() {
        let case = find("MAL-BINARY-GARBAGE");
        let first = payload_of(&case);
        let second = payload_of(&case);
        assert_eq!(first, second);
        assert_eq!(first.len(), 256);
    }

    #[test]
    fn test_timeout_tolerant_expectation() {
        let case = find("MAL-EMPTY-REQUEST");
        let expected = expectation_of(&case);
        assert_eq!(
            expected.evaluate(None, ConnectionState::TimedOut),
            Verdict::Pass
        );
        let ok = response("HTTP/1.1 200 OK\r\n\r\n");
        assert_eq!(
            expected.evaluate(Some(&ok), ConnectionState::Open),
            Verdict::Fail
        );
    }

    #[test]
    fn test_normalization_grades_echoed_header() {
        let case = find("NORM-UNDERSCORE-CL");
        let expected = expectation_of(&case);

        let normalized = response("HTTP/1.1 200 OK\r\n\r\nContent-Length: 99\r\nHost: x\r\n");
        assert_eq!(
            expected.evaluate(Some(&normalized), ConnectionState::Open),
            Verdict::Fail
        );

        let preserved = response("HTTP/1.1 200 OK\r\n\r\nContent_Length: 99\r\nHost: x\r\n");
        assert_eq!(
            expected.evaluate(Some(&preserved), ConnectionState::Open),
            Verdict::Warn
        );

        let dropped = response("HTTP/1.1 200 OK\r\n\r\nHost: x\r\n");
        assert_eq!(
            expected.evaluate(Some(&dropped), ConnectionState::Open),
            Verdict::Pass
        );

        let rejected = response("HTTP/1.1 400 Bad Request\r\n\r\n");
        assert_eq!(
            expected.evaluate(Some(&rejected), ConnectionState::Open),
            Verdict::Pass
        );
    }

    #[test]
    fn test_case_te_preserved_casing_warns() {
        let case = find("NORM-CASE-TE");
        let expected = expectation_of(&case);

        let preserved = response("HTTP/1.1 200 OK\r\n\r\nTRANSFER-ENCODING: chunked\r\n");
        assert_eq!(
            expected.evaluate(Some(&preserved), ConnectionState::Open),
            Verdict::Warn
        );

        let lowered = response("HTTP/1.1 200 OK\r\n\r\ntransfer-encoding: chunked\r\n");
        assert_eq!(
            expected.evaluate(Some(&lowered), ConnectionState::Open),
            Verdict::Fail
        );
    }

    #[test]
    fn test_etag_sequence_verdicts() {
        let case = find("CAP-ETAG-304");
        let validator = match &case.kind {
            CaseKind::Sequence { validator, .. } => validator,
            CaseKind::Single { .. } => panic!("expected a sequence case"),
        };

        let with_etag = response("HTTP/1.1 200 OK\r\nETag: \"abc\"\r\n\r\nbody");
        let not_modified = response("HTTP/1.1 304 Not Modified\r\n\r\n");
        let steps = vec![
            step(Some(with_etag), ConnectionState::Open, true),
            step(Some(not_modified), ConnectionState::Open, true),
        ];
        assert_eq!(validator(&steps), Verdict::Pass);

        let no_etag = response("HTTP/1.1 200 OK\r\n\r\nbody");
        let steps = vec![
            step(Some(no_etag), ConnectionState::Open, true),
            step(None, ConnectionState::ClosedByServer, false),
        ];
        assert_eq!(validator(&steps), Verdict::Warn);

        let steps = vec![
            step(None, ConnectionState::Error, true),
            step(None, ConnectionState::Error, false),
        ];
        assert_eq!(validator(&steps), Verdict::Error);
    }

    #[test]
    fn test_weak_etag_request_prefixes_strong_tag() {
        let case = find("CAP-ETAG-WEAK");
        let steps = match &case.kind {
            CaseKind::Sequence { steps, .. } => steps,
            CaseKind::Single { .. } => panic!("expected a sequence case"),
        };
        let with_etag = response("HTTP/1.1 200 OK\r\nETag: \"abc\"\r\n\r\n");
        let prior = vec![step(Some(with_etag), ConnectionState::Open, true)];
        let bytes = match &steps[1].payload {
            crate::cases::StepPayload::Dynamic(f) => f(&target(), &prior),
            _ => panic!("expected a dynamic step"),
        };
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("If-None-Match: W/\"abc\"\r\n"));
    }
}
