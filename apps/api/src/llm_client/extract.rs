//! Recovers JSON from free-text model replies.
//!
//! Models asked for "JSON only" still wrap answers in prose or code fences.
//! `extract_json_span` finds the first balanced `[...]` or `{...}` span by
//! bracket counting (string literals and escapes are skipped), and
//! `parse_reply` runs a strict JSON parse over that span. An unparseable reply
//! is an expected outcome, not an error.

use serde_json::Value;

/// Outcome of parsing a model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonReply {
    Parsed(Value),
    Unparseable { raw: String },
}

impl JsonReply {
    pub fn into_value(self) -> Option<Value> {
        match self {
            JsonReply::Parsed(v) => Some(v),
            JsonReply::Unparseable { .. } => None,
        }
    }
}

/// Returns the first balanced JSON array/object span in `text`, if any.
///
/// The span starts at whichever of `[` or `{` occurs first. A closing bracket
/// of the wrong kind, or running out of input, yields `None`.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().copied().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'[' => stack.push(b']'),
            b'{' => stack.push(b'}'),
            b']' | b'}' => {
                if stack.pop() != Some(byte) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extracts and strictly parses the first JSON span of a reply.
pub fn parse_reply(text: &str) -> JsonReply {
    extract_json_span(text)
        .and_then(|span| serde_json::from_str::<Value>(span).ok())
        .map(JsonReply::Parsed)
        .unwrap_or_else(|| JsonReply::Unparseable {
            raw: text.to_string(),
        })
}
