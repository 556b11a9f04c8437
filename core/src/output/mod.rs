//! Streaming output sinks for diff results.

pub mod json_lines;
