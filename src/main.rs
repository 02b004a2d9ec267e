use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bigology::PromptTemplate;
use bigology::cli::commands::analyze::{AnalyzeOptions, OutputFormat};

#[derive(Parser)]
#[command(name = "bigology")]
#[command(
    version,
    about = "AI-assisted Big-O complexity summaries for submitted solutions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, help = "Use this config file instead of global/project/env")]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the complexity of a solution
    Analyze {
        #[arg(help = "Source file, or '-' for stdin")]
        input: PathBuf,
        #[arg(long, short, help = "Language name (default: from file extension)")]
        language: Option<String>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: OutputFormat,
        #[arg(long, short, help = "Prompt template: structured, compact")]
        template: Option<PromptTemplate>,
    },

    /// Print the prompt that would be sent, without calling any provider
    Prompt {
        #[arg(help = "Source file, or '-' for stdin")]
        input: PathBuf,
        #[arg(long, short, help = "Language name (default: from file extension)")]
        language: Option<String>,
        #[arg(long, short, help = "Prompt template: structured, compact")]
        template: Option<PromptTemplate>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(long, help = "Print as JSON instead of TOML")]
        json: bool,
    },
    /// Show configuration file paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mbigology encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze {
            input,
            language,
            format,
            template,
        } => {
            let rt = Runtime::new()?;
            let analyzed = rt.block_on(bigology::cli::commands::analyze::run(AnalyzeOptions {
                input,
                language,
                format,
                template,
                config: cli.config,
                quiet: cli.quiet,
            }))?;
            if !analyzed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Prompt {
            input,
            language,
            template,
        } => {
            bigology::cli::commands::prompt::run(
                &input,
                language.as_deref(),
                template,
                cli.config.as_deref(),
            )?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                bigology::cli::commands::config::show(json)?;
            }
            ConfigAction::Path => {
                bigology::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                bigology::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
