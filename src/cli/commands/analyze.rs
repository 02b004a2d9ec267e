//! Analyze Command
//!
//! Run one submission through the analyzer and print the result.
//!
//! Usage:
//!   bigology analyze <FILE|-> [--language NAME] [--format text|json] [--template structured|compact]

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, info};

use crate::analyzer::ComplexityAnalyzer;
use crate::bridge::AnalysisService;
use crate::cli::ui::{Output, render_panel};
use crate::cli::{CommandContext, read_source, resolve_language};
use crate::config::PromptTemplate;
use crate::session::{Admission, SubmissionTracker, UserNotice};
use crate::types::{BigoError, ResponseEnvelope, Result};

/// How the outcome is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Rendered result panel
    #[default]
    Text,
    /// Response envelope as JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format '{}'. Valid values: text, json", s)),
        }
    }
}

/// Options for the analyze command
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub input: PathBuf,
    pub language: Option<String>,
    pub format: OutputFormat,
    pub template: Option<PromptTemplate>,
    pub config: Option<PathBuf>,
    pub quiet: bool,
}

/// Returns whether the analysis produced a result
pub async fn run(options: AnalyzeOptions) -> Result<bool> {
    let output = Output::quiet(options.quiet || options.format == OutputFormat::Json);
    let ctx = CommandContext::load(options.config.as_deref(), options.template)?;
    let source = read_source(&options.input)?;
    let language = resolve_language(options.language.as_deref(), source.detected_language);

    let mut tracker = SubmissionTracker::new();
    if tracker.try_begin(&source.code) == Admission::Empty {
        output.warning(&format!("Nothing to analyze in {}", source.origin));
        return Ok(false);
    }

    let analyzer = ComplexityAnalyzer::from_config(&ctx.config)?;
    let (handle, worker) = AnalysisService::spawn(analyzer);

    output.info(&format!(
        "Analyzing {} ({})",
        source.origin,
        if language.is_empty() {
            "unknown language"
        } else {
            language.as_str()
        }
    ));
    let outcome = handle.analyze(source.code, language).await;
    tracker.finish();

    drop(handle);
    if let Err(e) = worker.await {
        debug!("Analysis worker ended abnormally: {}", e);
    }

    report(&outcome, options.format, &output)
}

fn report(
    outcome: &std::result::Result<ResponseEnvelope, BigoError>,
    format: OutputFormat,
    output: &Output,
) -> Result<bool> {
    if format == OutputFormat::Json {
        let envelope = match outcome {
            Ok(envelope) => envelope.clone(),
            Err(err) => ResponseEnvelope::from_error(err),
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(envelope.is_success());
    }

    if let Some(notice) = UserNotice::for_outcome(outcome) {
        output.notice(&notice);
        return Ok(false);
    }

    if let Ok(ResponseEnvelope::Success(result)) = outcome {
        info!(provider = %result.provider, "Rendering result panel");
        println!("{}", render_panel(result));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnalysisResult;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_report_success_and_failure() {
        let output = Output::quiet(true);

        let success = Ok(ResponseEnvelope::from(AnalysisResult::default()));
        assert!(report(&success, OutputFormat::Text, &output).unwrap());
        assert!(report(&success, OutputFormat::Json, &output).unwrap());

        let failure = Ok(ResponseEnvelope::failure("AI services unavailable.", Some(503)));
        assert!(!report(&failure, OutputFormat::Text, &output).unwrap());

        let closed = Err(BigoError::ChannelClosed);
        assert!(!report(&closed, OutputFormat::Json, &output).unwrap());
    }

    #[tokio::test]
    async fn test_empty_input_is_not_analyzed() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("empty.rs");
        std::fs::write(&input, "   \n").unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "").unwrap();

        let analyzed = run(AnalyzeOptions {
            input,
            language: None,
            format: OutputFormat::Text,
            template: None,
            config: Some(config),
            quiet: true,
        })
        .await
        .unwrap();

        assert!(!analyzed);
    }
}
