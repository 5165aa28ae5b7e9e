//! Report rendering.

pub mod chart;
pub mod generator;
pub mod table;

pub use generator::{generate_json_report, generate_markdown_report, generate_text_report};
