//! An HTTP/1.1 server behavior probe library.
//!
//! This library drives a corpus of protocol conformance cases against a live
//! HTTP server over raw TCP, with a focus on precise wire control, lenient
//! response parsing, and honest verdicts.
//!
//! # Features
//!
//! - Raw TCP client that sends arbitrary byte payloads, no HTTP stack in the way
//! - Lenient response parser that copes with malformed and partial replies
//! - Built-in suites: RFC compliance, request smuggling, malformed input,
//!   header normalization, and conditional request capabilities
//! - Multi-step cases that reuse one connection, for keep-alive and
//!   pipelining behavior
//! - Console and JSON reporting with pass/fail/warn verdicts
//!
//! # Examples
//!
//! ## Parsing a raw response
//!
//! ```
//! use h1probe::parse_response;
//!
//! let raw = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nOK";
//!
//! match parse_response(raw) {
//!     Ok(response) => {
//!         println!("Status: {}", response.status_code);
//!         println!("Content-Type: {:?}", response.header("Content-Type"));
//!     }
//!     Err(err) => {
//!         println!("Error parsing response: {}", err);
//!     }
//! }
//! ```
//!
//! ## Running the built-in suites
//!
//! ```no_run
//! use h1probe::runner::{RunOptions, Runner};
//! use h1probe::{report, suites};
//!
//! # async fn probe() {
//! let options = RunOptions {
//!     host: "localhost".to_string(),
//!     port: 8080,
//!     ..RunOptions::default()
//! };
//!
//! let runner = Runner::new(options);
//! let report = runner
//!     .run(suites::all(), |result| report::print_result(result, false))
//!     .await;
//!
//! report::print_summary(&report);
//! # }
//! ```

pub mod cases;
pub mod client;
pub mod report;
pub mod response;
pub mod runner;
pub mod suites;

// Re-export commonly used items for convenience
pub use cases::{Case, Category, Expectation, RfcLevel, Target, Verdict};
pub use client::{ConnectionState, Error as ClientError, RawClient};
pub use response::{parse_response, Error as ResponseError, HttpResponse};
pub use runner::{CaseResult, Report, RunOptions, Runner};
