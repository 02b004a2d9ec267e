//! CLI Common Utilities
//!
//! Configuration and input handling shared by the command handlers.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::config::{Config, ConfigLoader, PromptTemplate};
use crate::types::{Result, language_from_path};

/// Path argument meaning "read standard input"
pub const STDIN_MARKER: &str = "-";

/// Command execution context
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Loaded configuration with command-line overrides applied
    pub config: Config,
}

impl CommandContext {
    /// Load configuration from `config_path` if given, else the full
    /// global → project → env chain, then apply overrides.
    pub fn load(config_path: Option<&Path>, template: Option<PromptTemplate>) -> Result<Self> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        Ok(Self::with_overrides(config, template))
    }

    pub fn with_overrides(mut config: Config, template: Option<PromptTemplate>) -> Self {
        if let Some(template) = template {
            debug!(%template, "Prompt template overridden");
            config.prompt.template = template;
        }
        Self { config }
    }
}

/// Source code read from a file or stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    pub code: String,
    /// Language inferred from the file extension
    pub detected_language: Option<&'static str>,
    /// Where the code came from, for messages
    pub origin: String,
}

/// Read submission code from `path`, or stdin when `path` is `-`
pub fn read_source(path: &Path) -> Result<SourceInput> {
    if path.as_os_str() == STDIN_MARKER {
        let mut code = String::new();
        std::io::stdin().read_to_string(&mut code)?;
        return Ok(SourceInput {
            code,
            detected_language: None,
            origin: "<stdin>".to_string(),
        });
    }

    let code = std::fs::read_to_string(path)?;
    Ok(SourceInput {
        code,
        detected_language: language_from_path(path),
        origin: path.display().to_string(),
    })
}

/// Explicit language wins over the detected one; empty when neither is known
pub fn resolve_language(explicit: Option<&str>, detected: Option<&str>) -> String {
    explicit
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(detected)
        .unwrap_or_default()
        .to_string()
}
