//! Prompt Builder
//!
//! Section-based construction of the analysis instruction sent to every
//! provider. Two templates exist:
//!
//! - **Structured**: demands a single JSON object with complexities,
//!   explanations, pattern, quality metrics and a suggestion
//! - **Compact**: demands two labeled lines (time, space)
//!
//! Source code is cut to a fixed number of characters before embedding.
//! The cut is a silent prefix truncation, never an error.

use crate::config::{PromptConfig, PromptTemplate};
use crate::constants::prompt::UNKNOWN_LANGUAGE;
use crate::types::truncate_chars;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Fenced block with an info string
    Code { language: String, content: String },
    /// Bulleted rules
    Rules(Vec<String>),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section introduced by a header line
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add code block
    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add rules section
    pub fn rules(mut self, rules: &[&str]) -> Self {
        self.sections.push(PromptSection::Rules(
            rules.iter().map(|r| r.to_string()).collect(),
        ));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let rendered: Vec<String> = self
            .sections
            .into_iter()
            .map(|section| match section {
                PromptSection::Text { header, content } => match header {
                    Some(h) => format!("{}\n{}", h, content),
                    None => content,
                },
                PromptSection::Code { language, content } => {
                    format!("```{}\n{}\n```", language, content)
                }
                PromptSection::Rules(rules) => {
                    let mut out = String::from("Rules:");
                    for rule in rules {
                        out.push_str("\n- ");
                        out.push_str(&rule);
                    }
                    out
                }
            })
            .collect();

        rendered.join("\n\n")
    }
}

// =============================================================================
// Templates
// =============================================================================

const JSON_SCHEMA: &str = r#"{
  "timeComplexity": {
    "best": "O(?)",
    "average": "O(?)",
    "worst": "O(?)"
  },
  "spaceComplexity": {
    "best": "O(?)",
    "average": "O(?)",
    "worst": "O(?)"
  },
  "detailedExplanation": {
    "timeAnalysis": "What drives the time complexity: loops, recursion, costly operations",
    "spaceAnalysis": "What drives the space complexity: data structures, recursion depth"
  },
  "pattern": "Algorithmic pattern used (e.g. 'Sliding Window', 'Two Pointers', 'DFS', 'Hash Map', 'Dynamic Programming')",
  "codeQuality": {
    "score": 85,
    "readability": 90,
    "efficiency": 80,
    "bestPractices": 85,
    "summary": "One sentence on overall code quality"
  },
  "suggestion": "One actionable improvement, or 'Optimal solution' if none applies"
}"#;

const NOTATION_RULE: &str =
    "Use standard Big O notation: O(1), O(log n), O(n), O(n log n), O(n^2), O(2^n), O(n!)";

/// Build the analysis prompt for a submission.
///
/// `code` is cut to `config.max_code_chars` characters; a blank `language`
/// is replaced with a neutral label.
pub fn build_prompt(code: &str, language: &str, config: &PromptConfig) -> String {
    let code = truncate_chars(code, config.max_code_chars);
    let language = match language.trim() {
        "" => UNKNOWN_LANGUAGE,
        lang => lang,
    };

    match config.template {
        PromptTemplate::Structured => structured(code, language),
        PromptTemplate::Compact => compact(code, language),
    }
}

fn structured(code: &str, language: &str) -> String {
    PromptBuilder::new()
        .text(&format!(
            "You are an expert algorithm complexity analyzer. Analyze the following {} code thoroughly.",
            language
        ))
        .section(
            "Return ONLY a valid JSON object with this exact structure (no markdown, no explanation outside JSON):",
            JSON_SCHEMA,
        )
        .text("Code to analyze:")
        .code(language, code)
        .rules(&[
            NOTATION_RULE,
            "Code quality scores must be integers from 0-100",
            "Be specific in explanations (mention variable names, line numbers if relevant)",
            "Return ONLY the JSON object, nothing else",
        ])
        .build()
}

fn compact(code: &str, language: &str) -> String {
    PromptBuilder::new()
        .text(&format!(
            "Analyze the time and space complexity of the following {} code.",
            language
        ))
        .code(language, code)
        .section(
            "Respond with exactly these two lines and nothing else:",
            "Time Complexity: O(...)\nSpace Complexity: O(...)",
        )
        .rules(&[NOTATION_RULE])
        .build()
}
