// src/answer/extract.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{trace, warn};

// Greedy: from the first '[' to the last ']' in the reply.
static JSON_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[.*\]").expect("JSON array pattern should compile"));

/// Pull the answer list out of free-form model text.
///
/// Never fails: no array-shaped substring, or one that isn't valid JSON,
/// yields an empty list.
pub fn extract_answers(text: &str) -> Vec<String> {
    let Some(m) = JSON_ARRAY.find(text) else {
        warn!(len = text.len(), "model reply contains no JSON array");
        return Vec::new();
    };

    match serde_json::from_str::<Vec<Value>>(m.as_str()) {
        Ok(values) => {
            trace!(count = values.len(), "parsed answers");
            values.into_iter().map(value_to_answer).collect()
        }
        Err(e) => {
            warn!(error = %e, "model reply array is not valid JSON");
            Vec::new()
        }
    }
}

fn value_to_answer(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
