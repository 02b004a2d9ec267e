//! Analysis request and canonical result types
//!
//! Every record here is built fresh per submission and dropped once the
//! envelope reaches the caller.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::defaults;

/// A single submission to analyze
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Correlation id for logs
    pub id: Uuid,
    pub code: String,
    pub language: String,
}

impl AnalysisRequest {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            language: language.into(),
        }
    }
}

/// Best/average/worst case notations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityEstimate {
    pub best: String,
    pub average: String,
    pub worst: String,
}

impl ComplexityEstimate {
    /// Same notation for every case
    pub fn uniform(notation: impl Into<String>) -> Self {
        let notation = notation.into();
        Self {
            best: notation.clone(),
            average: notation.clone(),
            worst: notation,
        }
    }

    pub fn default_time() -> Self {
        Self::uniform(defaults::TIME_NOTATION)
    }

    pub fn default_space() -> Self {
        Self::uniform(defaults::SPACE_NOTATION)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedExplanation {
    pub time_analysis: String,
    pub space_analysis: String,
}

/// Code quality scores, each within 0..=100
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub score: u8,
    pub readability: u8,
    pub efficiency: u8,
    pub best_practices: u8,
    pub summary: String,
}

impl QualityMetrics {
    /// Uniform scores with a summary
    pub fn uniform(value: u8, summary: impl Into<String>) -> Self {
        let value = value.min(100);
        Self {
            score: value,
            readability: value,
            efficiency: value,
            best_practices: value,
            summary: summary.into(),
        }
    }
}

/// Which slot of the provider chain produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Primary,
    Fallback,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Primary => write!(f, "primary"),
            ProviderKind::Fallback => write!(f, "fallback"),
        }
    }
}

/// Canonical, fully populated analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub time_complexity: ComplexityEstimate,
    pub space_complexity: ComplexityEstimate,
    pub detailed_explanation: DetailedExplanation,
    pub pattern: String,
    pub code_quality: QualityMetrics,
    pub suggestion: String,
    pub provider: ProviderKind,
}

impl Default for AnalysisResult {
    /// The record returned when nothing in the response was recognizable
    fn default() -> Self {
        Self {
            time_complexity: ComplexityEstimate::default_time(),
            space_complexity: ComplexityEstimate::default_space(),
            detailed_explanation: DetailedExplanation {
                time_analysis: "Analysis could not be determined".to_string(),
                space_analysis: "Analysis could not be determined".to_string(),
            },
            pattern: "Algorithm Analysis".to_string(),
            code_quality: QualityMetrics::uniform(
                defaults::UNPARSED_QUALITY,
                "Unable to fully analyze code quality",
            ),
            suggestion: "Consider reviewing the algorithm for optimization opportunities"
                .to_string(),
            provider: ProviderKind::Primary,
        }
    }
}

impl AnalysisResult {
    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    /// Default record with the given complexities filled uniformly
    pub fn from_notations(time: impl Into<String>, space: impl Into<String>) -> Self {
        Self {
            time_complexity: ComplexityEstimate::uniform(time),
            space_complexity: ComplexityEstimate::uniform(space),
            ..Self::default()
        }
    }
}

// =============================================================================
// Complexity Rating
// =============================================================================

/// Coarse performance rating of a notation, used for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityClass {
    /// O(1), O(log log n)
    Excellent,
    /// O(log n), O(√n)
    Good,
    /// O(n), O(n log n)
    Fair,
    /// O(n²)
    Poor,
    /// O(2^n), O(n!), O(n³) and worse
    Bad,
}

impl ComplexityClass {
    /// Rate a notation. Unrecognized notations rate as fair.
    pub fn classify(notation: &str) -> Self {
        let n: String = notation
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if n.contains("o(1)") || n.contains("o(loglogn)") {
            return Self::Excellent;
        }

        if n.contains("o(logn)") || n.contains("o(√n)") || n.contains("o(sqrtn)") {
            return Self::Good;
        }

        let quadratic = n.contains("o(n^2)") || n.contains("o(n²)") || n.contains("o(n2)");

        if n.contains("o(nlogn)") || (n.contains("o(n)") && !quadratic && !n.contains("o(n^")) {
            return Self::Fair;
        }

        if quadratic || n.contains("o(n²logn)") {
            return Self::Poor;
        }

        if n.contains("o(2^n)")
            || n.contains("o(n!)")
            || n.contains("o(n^3)")
            || n.contains("o(n³)")
            || n.contains("o(n3)")
            || n.contains("exponential")
            || n.contains("factorial")
        {
            return Self::Bad;
        }

        Self::Fair
    }
}

impl std::fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::Good => write!(f, "good"),
            Self::Fair => write!(f, "fair"),
            Self::Poor => write!(f, "poor"),
            Self::Bad => write!(f, "bad"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_fully_populated() {
        let result = AnalysisResult::default();
        assert_eq!(result.time_complexity, ComplexityEstimate::uniform("O(n)"));
        assert_eq!(result.space_complexity, ComplexityEstimate::uniform("O(1)"));
        assert_eq!(result.code_quality.score, 70);
        assert_eq!(result.code_quality.best_practices, 70);
        assert!(!result.pattern.is_empty());
        assert!(!result.suggestion.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = AnalysisResult::default().with_provider(ProviderKind::Fallback);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["timeComplexity"]["worst"], "O(n)");
        assert_eq!(value["spaceComplexity"]["best"], "O(1)");
        assert!(value["detailedExplanation"]["timeAnalysis"].is_string());
        assert_eq!(value["codeQuality"]["bestPractices"], 70);
        assert_eq!(value["provider"], "fallback");
    }

    #[test]
    fn test_uniform_quality_is_capped() {
        let metrics = QualityMetrics::uniform(250, "x");
        assert_eq!(metrics.score, 100);
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = AnalysisRequest::new("x", "Rust");
        let b = AnalysisRequest::new("x", "Rust");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_classify_complexity() {
        assert_eq!(ComplexityClass::classify("O(1)"), ComplexityClass::Excellent);
        assert_eq!(ComplexityClass::classify("O(log log n)"), ComplexityClass::Excellent);
        assert_eq!(ComplexityClass::classify("O(log n)"), ComplexityClass::Good);
        assert_eq!(ComplexityClass::classify("O(√n)"), ComplexityClass::Good);
        assert_eq!(ComplexityClass::classify("O(n)"), ComplexityClass::Fair);
        assert_eq!(ComplexityClass::classify("O(n log n)"), ComplexityClass::Fair);
        assert_eq!(ComplexityClass::classify("O(n^2)"), ComplexityClass::Poor);
        assert_eq!(ComplexityClass::classify("O(n²)"), ComplexityClass::Poor);
        assert_eq!(ComplexityClass::classify("O(2^n)"), ComplexityClass::Bad);
        assert_eq!(ComplexityClass::classify("O(n!)"), ComplexityClass::Bad);
        assert_eq!(ComplexityClass::classify("O(n^3)"), ComplexityClass::Bad);
        assert_eq!(ComplexityClass::classify("O(m * k)"), ComplexityClass::Fair);
    }
}
