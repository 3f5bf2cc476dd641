//! Report rendering.
//!
//! Two renderers over the same [`Report`](crate::runner::Report): a colored
//! console table for interactive runs, and a JSON document for pipelines.

mod console;
mod json;

pub use console::{print_header, print_result, print_summary};
pub use json::render_json;
