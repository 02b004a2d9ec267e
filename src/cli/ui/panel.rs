//! Result panel
//!
//! Renders an [`AnalysisResult`] for the terminal, coloring each notation by
//! its [`ComplexityClass`].

use console::{Style, style};

use crate::types::{AnalysisResult, ComplexityClass, ComplexityEstimate};

const RULE_WIDTH: usize = 48;

fn class_style(class: ComplexityClass) -> Style {
    match class {
        ComplexityClass::Excellent => Style::new().green().bold(),
        ComplexityClass::Good => Style::new().cyan().bold(),
        ComplexityClass::Fair => Style::new().yellow().bold(),
        ComplexityClass::Poor => Style::new().magenta().bold(),
        ComplexityClass::Bad => Style::new().red().bold(),
    }
}

fn estimate_line(label: &str, estimate: &ComplexityEstimate) -> String {
    let class = ComplexityClass::classify(&estimate.worst);
    let line = format!(
        "{:<8}{}  {}",
        label,
        class_style(class).apply_to(&estimate.worst),
        style(format!("[{}]", class)).dim()
    );

    if estimate.best == estimate.worst && estimate.average == estimate.worst {
        return line;
    }
    format!(
        "{}  best {} · average {}",
        line, estimate.best, estimate.average
    )
}

/// Multi-line panel text for a result
pub fn render_panel(result: &AnalysisResult) -> String {
    let quality = &result.code_quality;
    let explanation = &result.detailed_explanation;

    [
        format!(
            "{}  {}",
            style("Complexity Analysis").bold(),
            style(format!("via {}", result.provider)).dim()
        ),
        "─".repeat(RULE_WIDTH),
        estimate_line("Time", &result.time_complexity),
        estimate_line("Space", &result.space_complexity),
        String::new(),
        format!("{:<10}{}", "Pattern", result.pattern),
        format!(
            "{:<10}{}/100  readability {} · efficiency {} · best practices {}",
            "Quality",
            quality.score,
            quality.readability,
            quality.efficiency,
            quality.best_practices
        ),
        format!("{:<10}{}", "", quality.summary),
        String::new(),
        style("Time").bold().to_string(),
        format!("  {}", explanation.time_analysis),
        style("Space").bold().to_string(),
        format!("  {}", explanation.space_analysis),
        style("Suggestion").bold().to_string(),
        format!("  {}", result.suggestion),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> String {
        console::strip_ansi_codes(text).into_owned()
    }

    #[test]
    fn test_panel_contains_every_field() {
        let mut result = AnalysisResult::from_notations("O(n log n)", "O(1)");
        result.pattern = "Divide and Conquer".to_string();
        let text = plain(&render_panel(&result));

        assert!(text.contains("O(n log n)  [fair]"));
        assert!(text.contains("O(1)  [excellent]"));
        assert!(text.contains("Divide and Conquer"));
        assert!(text.contains("70/100"));
        assert!(text.contains(&result.suggestion));
        assert!(text.contains(&result.detailed_explanation.time_analysis));
        assert!(text.contains("via primary"));
    }

    #[test]
    fn test_cases_shown_only_when_they_differ() {
        let mut result = AnalysisResult::from_notations("O(n)", "O(1)");
        let text = plain(&render_panel(&result));
        assert!(!text.contains("best O("));
        assert!(text.contains("best practices 70"));

        result.time_complexity = ComplexityEstimate {
            best: "O(1)".to_string(),
            average: "O(n)".to_string(),
            worst: "O(n^2)".to_string(),
        };
        let text = plain(&render_panel(&result));
        assert!(text.contains("O(n^2)  [poor]  best O(1) · average O(n)"));
    }
}
