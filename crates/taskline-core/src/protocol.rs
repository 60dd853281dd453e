//! Parsers for the text protocol embedded in manager responses.
//!
//! - plan: a JSON task array inside `<output>...</output>`, optionally fenced
//!   and/or prefixed with `json`
//! - assign: a worker index, bare or leading the text
//! - summarize: narrative inside `<final_answer>...</final_answer>`

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{Plan, ProtocolError, Task};

pub const OUTPUT_TAG: &str = "output";
pub const FINAL_ANSWER_TAG: &str = "final_answer";

/// How a worker index was read from the manager's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexParse {
    /// The whole (trimmed) answer was an integer.
    Exact,
    /// Only the leading run of digits was usable.
    LeadingDigits,
}

/// Worker index proposed by the manager. Not yet range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerIndex {
    pub value: i64,
    pub parse: IndexParse,
}

fn leading_digits() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+").expect("leading digit pattern is valid"))
}

/// Text between the first `<tag>` and the `</tag>` that follows it.
pub fn extract_tagged<'a>(text: &'a str, tag: &'static str) -> Result<&'a str, ProtocolError> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = text
        .find(&open)
        .map(|i| i + open.len())
        .ok_or(ProtocolError::MissingTag { tag })?;
    let len = text[start..]
        .find(&close)
        .ok_or(ProtocolError::MissingTag { tag })?;
    Ok(&text[start..start + len])
}

/// Remove a surrounding Markdown fence and a leading `json` language tag.
///
/// The opening fence and the tag may come in either order.
pub fn strip_code_fence(payload: &str) -> &str {
    let mut body = payload.trim();
    while let Some(rest) = body
        .strip_prefix("```")
        .or_else(|| body.strip_prefix("json"))
    {
        body = rest.trim_start();
    }
    body = body.trim();
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parse a plan response into a [`Plan`].
pub fn parse_plan(response: &str) -> Result<Plan, ProtocolError> {
    let payload = extract_tagged(response, OUTPUT_TAG)?;
    let tasks: Vec<Task> = serde_json::from_str(strip_code_fence(payload))?;
    Plan::new(tasks)
}

/// Read a worker index: exact integer first, then the leading digits.
pub fn parse_worker_index(response: &str) -> Result<WorkerIndex, ProtocolError> {
    let trimmed = response.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(WorkerIndex {
            value,
            parse: IndexParse::Exact,
        });
    }
    leading_digits()
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .map(|value| WorkerIndex {
            value,
            parse: IndexParse::LeadingDigits,
        })
        .ok_or_else(|| ProtocolError::InvalidWorkerIndex {
            raw: response.to_string(),
        })
}

/// Extract the narrative of a summarize response.
pub fn extract_final_answer(response: &str) -> Result<String, ProtocolError> {
    extract_tagged(response, FINAL_ANSWER_TAG).map(|answer| answer.trim().to_string())
}
