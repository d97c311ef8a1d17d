//! Backend output normalization
//!
//! Both backends end up as plain text. The vision model answers with JSON
//! whose shape depends on the endpoint, the library hands back recognized
//! regions that may carry no text at all.

use serde_json::Value;

/// Extract the generated text from an Ollama response body
///
/// `/api/chat` answers with `{"message": {"content": ...}}`, `/api/generate`
/// with `{"response": ...}`. Anything else yields an empty string.
pub fn vlm_text(body: &Value) -> String {
    body.get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .or_else(|| body.get("response").and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

/// Join recognized lines in detection order, dropping empty regions
pub fn join_lines<'a, I>(lines: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    lines
        .into_iter()
        .flatten()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
