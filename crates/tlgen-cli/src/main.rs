//! tlgen CLI - TL schema compiler
//!
//! Commands:
//! - `tlgen generate` - Compile a schema into output units
//! - `tlgen check` - Load and normalize a schema, report what it contains

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tlgen_core::{GenError, LogLevel};

mod check;
mod generate;
mod logging;
mod settings;

#[derive(Parser)]
#[command(name = "tlgen")]
#[command(author, version, about = "TL schema compiler", long_about = None)]
struct Cli {
    /// Path to tlgen.toml settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code from a schema
    Generate(generate::GenerateArgs),

    /// Validate a schema without generating anything
    Check {
        /// Schema file (default: `schema_file` from settings)
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let base = settings::load(cli.config.as_deref())?;
    logging::init(cli.log_level, base.log_level);

    match cli.command {
        Commands::Generate(args) => generate::run(base, &args),
        Commands::Check { schema } => check::run(&base, schema),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err
                .downcast_ref::<GenError>()
                .map_or(1, |e| u8::try_from(e.error_code()).unwrap_or(1));
            ExitCode::from(code)
        }
    }
}
