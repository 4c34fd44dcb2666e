//! Structured-value extraction from free-form model output
//!
//! Models wrap JSON in prose, markdown fences, or both, and sometimes stop
//! half way through. [`extract`] recovers the JSON object or array if there
//! is one and reports [`Extracted::NotFound`] otherwise. It never panics and
//! never returns an error: failure is a value.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

/// Fenced code block, optionally tagged `json`; the body is captured lazily
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?i:json)?\s*(.*?)\s*```").expect("fence pattern is valid"));

/// Result of looking for a structured value in text
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Object(Map<String, Value>),
    List(Vec<Value>),
    NotFound,
}

impl Extracted {
    /// Short name of the shape, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Extracted::Object(_) => "object",
            Extracted::List(_) => "list",
            Extracted::NotFound => "nothing",
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Extracted::NotFound)
    }

    /// Back to a plain JSON value, if anything was found
    pub fn into_value(self) -> Option<Value> {
        match self {
            Extracted::Object(map) => Some(Value::Object(map)),
            Extracted::List(items) => Some(Value::Array(items)),
            Extracted::NotFound => None,
        }
    }
}

/// Recover a JSON object or array from model output
///
/// 1. The first fenced code block wins if there is one.
/// 2. Otherwise the span from the first `{`/`[` to the last `}`/`]`.
/// 3. The candidate must parse as an object or array.
pub fn extract(text: &str) -> Extracted {
    debug!(text_len = text.len(), "extract: called");
    let Some(candidate) = candidate(text) else {
        debug!("extract: no candidate span");
        return Extracted::NotFound;
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => {
            debug!(keys = map.len(), "extract: object");
            Extracted::Object(map)
        }
        Ok(Value::Array(items)) => {
            debug!(items = items.len(), "extract: list");
            Extracted::List(items)
        }
        Ok(other) => {
            debug!(kind = ?other, "extract: scalar is not a structured value");
            Extracted::NotFound
        }
        Err(e) => {
            debug!(error = %e, "extract: candidate did not parse");
            Extracted::NotFound
        }
    }
}

/// Pick the substring that should hold the JSON
fn candidate(text: &str) -> Option<&str> {
    if let Some(caps) = FENCE_RE.captures(text)
        && let Some(body) = caps.get(1)
    {
        debug!("candidate: using fenced block");
        return Some(body.as_str());
    }

    let start = match (text.find('{'), text.find('[')) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return None,
    };
    let end = match (text.rfind('}'), text.rfind(']')) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return None,
    };

    if end < start {
        return None;
    }
    // Delimiters are single-byte ASCII, so end + 1 is a char boundary
    Some(&text[start..=end])
}

/// First `max_chars` characters of `text`, with an ellipsis if cut
pub fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
