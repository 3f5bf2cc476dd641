//! Tests for the case model.

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::cases::{Case, Category, Expectation, Target, Verdict};
    use crate::client::ConnectionState;
    use crate::response::parse_response;

    fn ok_response() -> crate::response::HttpResponse {
        parse_response(b"HTTP/1.1 200 OK\r\n\r\n").unwrap()
    }

    fn status_response(code: u16) -> crate::response::HttpResponse {
        parse_response(format!("HTTP/1.1 {code} X\r\n\r\n").as_bytes()).unwrap()
    }

    #[test]
    fn test_host_header_omits_port_80() {
        assert_eq!(Target::new("example.com", 80).host_header(), "example.com");
        assert_eq!(
            Target::new("example.com", 8080).host_header(),
            "example.com:8080"
        );
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            Category::from_str("Compliance").unwrap(),
            Category::Compliance
        );
        assert_eq!(
            Category::from_str("malformed").unwrap(),
            Category::MalformedInput
        );
        assert_eq!(
            Category::from_str("MALFORMED-INPUT").unwrap(),
            Category::MalformedInput
        );
        assert!(Category::from_str("cookies").is_err());
    }

    #[test]
    fn test_exact_status_expectation() {
        let expected = Expectation::status(400);
        assert_eq!(expected.label(), "400");
        assert_eq!(
            expected.evaluate(Some(&status_response(400)), ConnectionState::Open),
            Verdict::Pass
        );
        assert_eq!(
            expected.evaluate(Some(&ok_response()), ConnectionState::Open),
            Verdict::Fail
        );
        // Close is not acceptable unless opted in.
        assert_eq!(
            expected.evaluate(None, ConnectionState::ClosedByServer),
            Verdict::Fail
        );
    }

    #[test]
    fn test_or_close_expectation() {
        let expected = Expectation::status(400).or_close();
        assert_eq!(expected.label(), "400/close");
        assert_eq!(
            expected.evaluate(None, ConnectionState::ClosedByServer),
            Verdict::Pass
        );
        assert_eq!(
            expected.evaluate(None, ConnectionState::TimedOut),
            Verdict::Error
        );
    }

    #[test]
    fn test_success_expectation() {
        let expected = Expectation::success();
        assert_eq!(expected.label(), "2xx");
        assert_eq!(
            expected.evaluate(Some(&status_response(204)), ConnectionState::Open),
            Verdict::Pass
        );
        assert_eq!(
            expected.evaluate(Some(&status_response(404)), ConnectionState::Open),
            Verdict::Fail
        );
    }

    #[test]
    fn test_any_of_expectation() {
        let expected = Expectation::any_of(&[400, 501]);
        assert_eq!(expected.label(), "400/501");
        assert_eq!(
            expected.evaluate(Some(&status_response(501)), ConnectionState::Open),
            Verdict::Pass
        );
        assert_eq!(
            expected.evaluate(Some(&status_response(500)), ConnectionState::Open),
            Verdict::Fail
        );
    }

    #[test]
    fn test_custom_expectation() {
        let expected = Expectation::custom("no 101", |response, _| match response {
            Some(r) if r.status_code == 101 => Verdict::Fail,
            Some(_) => Verdict::Pass,
            None => Verdict::Warn,
        });
        assert_eq!(
            expected.evaluate(Some(&status_response(101)), ConnectionState::Open),
            Verdict::Fail
        );
        assert_eq!(
            expected.evaluate(None, ConnectionState::Open),
            Verdict::Warn
        );
    }

    #[test]
    fn test_case_builder_defaults() {
        let case = Case::single(
            "T-1",
            "test case",
            Category::Compliance,
            |t| format!("GET / HTTP/1.1\r\nHost: {}\r\n\r\n", t.host_header()).into_bytes(),
            Expectation::success(),
        );
        assert!(case.scored);
        assert!(case.rfc_reference.is_none());
        assert_eq!(case.expected_label(), "2xx");

        let case = case.unscored().with_rfc("RFC 9112 §3");
        assert!(!case.scored);
        assert_eq!(case.rfc_reference, Some("RFC 9112 §3"));
    }
}
