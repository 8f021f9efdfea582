//! Extraction of error messages from failed responses.

use serde_json::Value;

/// Longest raw-text body echoed back as an error message.
const MAX_RAW_MESSAGE: usize = 512;

/// Build a human-readable message for a non-2xx response.
///
/// Prefers a JSON `message` field, then `error` (string or object with a
/// `message`), then the raw body text, then a generic status line.
pub fn extract_error_message(status: u16, body: &str) -> String {
    let trimmed = body.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        let from_json = map
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| match map.get("error") {
                Some(Value::String(s)) => Some(s.as_str()),
                Some(Value::Object(inner)) => inner.get("message").and_then(Value::as_str),
                _ => None,
            })
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if let Some(message) = from_json {
            return message.to_string();
        }
    }

    let is_json = serde_json::from_str::<Value>(trimmed).is_ok();
    if !trimmed.is_empty() && !is_json {
        return truncate(trimmed, MAX_RAW_MESSAGE);
    }

    format!("Request failed with status {status}")
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}
