//! Response Normalizer
//!
//! Turns raw provider text into a fully populated [`AnalysisResult`].
//! Strategies run in priority order and the first one that recognizes the
//! text wins:
//!
//! 1. Structured JSON (rich or legacy schema)
//! 2. Labeled `Time Complexity: O(..)` / `Space Complexity: O(..)` lines
//! 3. Scan for bare `O(..)` tokens
//!
//! When every strategy declines, the default record is returned. Normalizing
//! never fails.

mod json;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::types::AnalysisResult;

/// A pure extraction attempt over the raw text
pub type Strategy = fn(&str) -> Option<AnalysisResult>;

/// Strategies in priority order
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("json", json::from_json),
    ("labeled", from_labels),
    ("tokens", from_tokens),
];

// Notation body: any text with at most one level of nested parentheses,
// e.g. `max(m, n)` or `n log(n)`.
static TIME_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Time\s*Complexity[:\s]*O\(((?:[^()]|\([^()]*\))+)\)")
        .expect("valid regex literal")
});

static SPACE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Space\s*Complexity[:\s]*O\(((?:[^()]|\([^()]*\))+)\)")
        .expect("valid regex literal")
});

// `\b` keeps identifiers such as `memo(n)` out
static NOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bO\((?:[^()]|\([^()]*\))+\)").expect("valid regex literal")
});

/// Normalize raw provider text into a canonical result
pub fn normalize(raw: &str) -> AnalysisResult {
    let text = raw.trim();

    for (name, strategy) in STRATEGIES {
        if let Some(result) = strategy(text) {
            debug!(strategy = %name, "Normalized provider response");
            return result;
        }
        debug!(strategy = %name, "Strategy did not match, falling through");
    }

    warn!("Could not extract any complexity, using defaults");
    AnalysisResult::default()
}

fn labeled_notation(re: &Regex, text: &str) -> Option<String> {
    let inner = re.captures(text)?.get(1)?.as_str().trim();
    Some(format!("O({})", inner))
}

fn from_labels(text: &str) -> Option<AnalysisResult> {
    let time = labeled_notation(&TIME_LABEL, text)?;
    let space = labeled_notation(&SPACE_LABEL, text)?;
    Some(AnalysisResult::from_notations(time, space))
}

/// `o(n)` → `O(n)`
fn canonical_token(token: &str) -> String {
    match token.strip_prefix('o') {
        Some(rest) => format!("O{}", rest),
        None => token.to_string(),
    }
}

fn from_tokens(text: &str) -> Option<AnalysisResult> {
    let mut tokens = NOTATION
        .find_iter(text)
        .map(|m| canonical_token(m.as_str().trim()));
    let time = tokens.next()?;
    let space = tokens.next().unwrap_or_else(|| time.clone());
    Some(AnalysisResult::from_notations(time, space))
}
