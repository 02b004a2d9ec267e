//! Shared utility functions for JSON extraction and text handling.
//!
//! ## JSON Extraction Helpers
//!
//! Lenient helpers for pulling fields out of model-produced `serde_json::Value`s:
//! - `json_text`, `json_text_or` - Non-empty, trimmed strings
//! - `json_score` - Integer scores clamped to 0..=100

use serde_json::Value;

// =============================================================================
// JSON Value Extraction Helpers
// =============================================================================

/// Extract a non-empty trimmed string by key.
///
/// Empty or whitespace-only strings count as absent.
#[inline]
pub fn json_text(value: &Value, key: &str) -> Option<String> {
    let text = value.get(key)?.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Extract a non-empty trimmed string with default value.
#[inline]
pub fn json_text_or(value: &Value, key: &str, default: &str) -> String {
    json_text(value, key).unwrap_or_else(|| default.to_string())
}

/// Extract a 0..=100 score by key.
///
/// Accepts integers, floats (rounded) and numeric strings. Out-of-range values
/// are clamped; absent or non-numeric values yield `None`.
pub fn json_score(value: &Value, key: &str) -> Option<u8> {
    let raw = match value.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if raw.is_nan() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u8)
}

// =============================================================================
// String Utilities
// =============================================================================

/// Cut `text` to at most `max_chars` characters (not bytes).
///
/// Returns the input unchanged when it already fits.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_text() {
        let v = json!({"a": "  O(n) ", "b": "", "c": "   ", "d": 5});
        assert_eq!(json_text(&v, "a").as_deref(), Some("O(n)"));
        assert_eq!(json_text(&v, "b"), None);
        assert_eq!(json_text(&v, "c"), None);
        assert_eq!(json_text(&v, "d"), None);
        assert_eq!(json_text(&v, "missing"), None);
        assert_eq!(json_text_or(&v, "b", "fallback"), "fallback");
    }

    #[test]
    fn test_json_score() {
        let v = json!({
            "int": 85,
            "high": 150,
            "low": -3,
            "float": 72.6,
            "text": "64",
            "word": "great",
            "null": null
        });
        assert_eq!(json_score(&v, "int"), Some(85));
        assert_eq!(json_score(&v, "high"), Some(100));
        assert_eq!(json_score(&v, "low"), Some(0));
        assert_eq!(json_score(&v, "float"), Some(73));
        assert_eq!(json_score(&v, "text"), Some(64));
        assert_eq!(json_score(&v, "word"), None);
        assert_eq!(json_score(&v, "null"), None);
        assert_eq!(json_score(&v, "missing"), None);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("ab", 3), "ab");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 0), "");
    }
}
