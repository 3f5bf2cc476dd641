//! Tests for the response parser.

#[cfg(test)]
mod tests {
    use crate::response::{parse_response, truncate_chars, Error, BODY_CAP};

    #[test]
    fn test_parse_simple_response() {
        let response = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nOK";
        let result = parse_response(response).unwrap();
        assert_eq!(result.version, "1.1");
        assert_eq!(result.status_code, 200);
        assert_eq!(result.reason, "OK");
        assert_eq!(result.header("content-type").unwrap(), "text/plain");
        assert_eq!(result.body, "OK");
        assert!(result.is_success());
    }

    #[test]
    fn test_case_insensitive_headers() {
        let response = b"HTTP/1.1 200 OK\r\nX-Test: value\r\n\r\n";
        let result = parse_response(response).unwrap();
        assert!(result.has_header("x-test"));
        assert!(result.has_header("X-TEST"));
        assert_eq!(result.header("X-Test").unwrap(), "value");
    }

    #[test]
    fn test_duplicate_headers_joined() {
        let response = b"HTTP/1.1 200 OK\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\n";
        let result = parse_response(response).unwrap();
        assert_eq!(result.header("set-cookie").unwrap(), "a=1, b=2");
    }

    #[test]
    fn test_missing_reason_phrase() {
        let response = b"HTTP/1.1 400\r\n\r\n";
        let result = parse_response(response).unwrap();
        assert_eq!(result.status_code, 400);
        assert_eq!(result.reason, "");
    }

    #[test]
    fn test_multi_word_reason_phrase() {
        let response = b"HTTP/1.1 431 Request Header Fields Too Large\r\n\r\n";
        let result = parse_response(response).unwrap();
        assert_eq!(result.status_code, 431);
        assert_eq!(result.reason, "Request Header Fields Too Large");
    }

    #[test]
    fn test_malformed_header_line_skipped() {
        let response = b"HTTP/1.1 200 OK\r\nGood: yes\r\nNoColonHere\r\n\r\n";
        let result = parse_response(response).unwrap();
        assert_eq!(result.header("good").unwrap(), "yes");
        assert_eq!(result.headers.len(), 1);
    }

    #[test]
    fn test_empty_response() {
        let result = parse_response(b"");
        assert!(matches!(result, Err(Error::EmptyResponse)));
    }

    #[test]
    fn test_not_http() {
        let result = parse_response(b"SSH-2.0-OpenSSH_9.0\r\n");
        assert!(matches!(result, Err(Error::NotHttp)));
    }

    #[test]
    fn test_invalid_status_code() {
        let result = parse_response(b"HTTP/1.1 XYZ Bad\r\n\r\n");
        assert!(matches!(result, Err(Error::InvalidStatusCode(ref c)) if c == "XYZ"));
    }

    #[test]
    fn test_no_header_terminator_still_parses_status() {
        let response = b"HTTP/1.1 200 OK\r\nContent-Type: text";
        let result = parse_response(response).unwrap();
        assert_eq!(result.status_code, 200);
        assert_eq!(result.body, "");
    }

    #[test]
    fn test_body_is_capped() {
        let mut response = b"HTTP/1.1 200 OK\r\n\r\n".to_vec();
        response.extend(std::iter::repeat(b'A').take(BODY_CAP + 100));
        let result = parse_response(&response).unwrap();
        assert_eq!(result.body.len(), BODY_CAP);
    }

    #[test]
    fn test_non_utf8_bytes_replaced() {
        let response = b"HTTP/1.1 200 OK\r\nX-Bin: \xff\xfe\r\n\r\n";
        let result = parse_response(response).unwrap();
        assert_eq!(result.status_code, 200);
        assert!(result.has_header("x-bin"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // "é" is two bytes in UTF-8; truncating mid-character must back off.
        let s = "aé";
        assert_eq!(truncate_chars(s, 2), "a");
        assert_eq!(truncate_chars(s, 3), "aé");
    }
}
