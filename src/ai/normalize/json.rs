//! JSON extraction and schema mapping
//!
//! Models wrap their JSON in prose or markdown fences, so the candidate is the
//! span from the first `{` to the last `}`. Two schemas are recognized:
//!
//! - **Rich**: `timeComplexity` is an object with a non-empty `worst`
//! - **Legacy**: `timeComplexity` is a plain notation string
//!
//! Anything else yields `None` so the next strategy can run.

use serde_json::Value;
use tracing::debug;

use crate::constants::defaults;
use crate::types::{
    AnalysisResult, ComplexityEstimate, DetailedExplanation, QualityMetrics, json_score,
    json_text, json_text_or,
};

/// Outermost `{...}` span, greedy on both ends
pub(crate) fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse the brace span, retrying once with trailing commas removed
pub(crate) fn parse_object(text: &str) -> Option<Value> {
    let span = brace_span(text)?;

    let parsed = match serde_json::from_str::<Value>(span) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("JSON parse failed ({}), retrying with trailing commas removed", e);
            serde_json::from_str::<Value>(&fix_trailing_commas(span)).ok()
        }
    };

    parsed.filter(Value::is_object)
}

/// Drop commas directly followed (ignoring whitespace) by `]` or `}`
/// outside string literals.
fn fix_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape {
            escape = false;
            result.push(ch);
            continue;
        }

        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some(']') | Some('}')) {
                    continue;
                }
            }
            _ => {}
        }

        result.push(ch);
    }

    result
}

pub(crate) fn from_json(raw: &str) -> Option<AnalysisResult> {
    let value = parse_object(raw)?;
    let time = value.get("timeComplexity")?;

    if time.is_object() && json_text(time, "worst").is_some() {
        return Some(rich(&value, time));
    }

    if let Some(notation) = time.as_str().map(str::trim).filter(|s| !s.is_empty()) {
        return Some(legacy(&value, notation));
    }

    debug!("JSON object has no recognizable timeComplexity");
    None
}

fn estimate(value: Option<&Value>, fallback: &str) -> ComplexityEstimate {
    let field = |key: &str| {
        value
            .and_then(|v| json_text(v, key))
            .unwrap_or_else(|| fallback.to_string())
    };

    ComplexityEstimate {
        best: field("best"),
        average: field("average"),
        worst: field("worst"),
    }
}

fn rich(value: &Value, time: &Value) -> AnalysisResult {
    let explanation = value.get("detailedExplanation").unwrap_or(&Value::Null);
    let quality = value.get("codeQuality").unwrap_or(&Value::Null);
    let score = |key: &str| json_score(quality, key).unwrap_or(defaults::MISSING_QUALITY);

    AnalysisResult {
        time_complexity: estimate(Some(time), defaults::TIME_NOTATION),
        space_complexity: estimate(value.get("spaceComplexity"), defaults::SPACE_NOTATION),
        detailed_explanation: DetailedExplanation {
            time_analysis: json_text_or(explanation, "timeAnalysis", "Time analysis not available"),
            space_analysis: json_text_or(
                explanation,
                "spaceAnalysis",
                "Space analysis not available",
            ),
        },
        pattern: json_text_or(value, "pattern", "General Algorithm"),
        code_quality: QualityMetrics {
            score: score("score"),
            readability: score("readability"),
            efficiency: score("efficiency"),
            best_practices: score("bestPractices"),
            summary: json_text_or(quality, "summary", "Code analysis complete"),
        },
        suggestion: json_text_or(value, "suggestion", "No specific suggestions"),
        ..AnalysisResult::default()
    }
}

fn legacy(value: &Value, time: &str) -> AnalysisResult {
    let space = json_text_or(value, "spaceComplexity", defaults::SPACE_NOTATION);
    let base = AnalysisResult::from_notations(time, space);

    AnalysisResult {
        detailed_explanation: DetailedExplanation {
            time_analysis: json_text_or(value, "reasoning", "Analysis from model response"),
            space_analysis: "Space analysis not available in legacy format".to_string(),
        },
        pattern: json_text_or(value, "pattern", &base.pattern),
        suggestion: json_text_or(value, "suggestion", "No specific suggestions"),
        ..base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_span_is_greedy() {
        assert_eq!(brace_span("x {a} y {b} z"), Some("{a} y {b}"));
        assert_eq!(brace_span("} then {"), None);
        assert_eq!(brace_span("no braces"), None);
    }

    #[test]
    fn test_fix_trailing_commas() {
        assert_eq!(fix_trailing_commas(r#"{"a": [1, 2,], }"#), r#"{"a": [1, 2] }"#);
        assert_eq!(fix_trailing_commas(r#"{"a": ",}"}"#), r#"{"a": ",}"}"#);
    }

    #[test]
    fn test_parse_object_repairs_trailing_comma() {
        let value = parse_object("```json\n{\"timeComplexity\": \"O(n)\",}\n```").unwrap();
        assert_eq!(value["timeComplexity"], "O(n)");
    }

    #[test]
    fn test_non_object_timecomplexity_is_rejected() {
        assert!(from_json(r#"{"timeComplexity": 5}"#).is_none());
        assert!(from_json(r#"{"timeComplexity": {"best": "O(1)"}}"#).is_none());
        assert!(from_json(r#"{"timeComplexity": "   "}"#).is_none());
        assert!(from_json(r#"{"pattern": "DFS"}"#).is_none());
    }
}
