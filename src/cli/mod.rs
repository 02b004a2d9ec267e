pub mod commands;
pub mod ui;
pub mod util;

pub use util::{CommandContext, SourceInput, read_source, resolve_language};
