//! Prompt Command
//!
//! Print the exact prompt that `analyze` would send, without contacting any
//! provider.

use std::path::Path;

use crate::ai::build_prompt;
use crate::cli::{CommandContext, read_source, resolve_language};
use crate::config::PromptTemplate;
use crate::types::Result;

pub fn run(
    input: &Path,
    language: Option<&str>,
    template: Option<PromptTemplate>,
    config: Option<&Path>,
) -> Result<()> {
    let ctx = CommandContext::load(config, template)?;
    let source = read_source(input)?;
    let language = resolve_language(language, source.detected_language);

    println!(
        "{}",
        build_prompt(&source.code, &language, &ctx.config.prompt)
    );
    Ok(())
}
