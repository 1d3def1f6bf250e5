//! `tlgen generate`

use crate::settings::{self, Overrides};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tlgen_codegen::{Generated, WriteReport, generate_from_settings, write_units};
use tlgen_core::{GenSettings, default_passes};

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Schema file (default: `schema_file` from settings)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Output directory for generated units
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also generate internal functions
    #[arg(long)]
    pub gen_internals: bool,

    /// Type whose store/fetch the runtime supplies (repeatable)
    #[arg(long = "custom-impl-type", value_name = "NAME")]
    pub custom_impl_types: Vec<String>,

    /// Emit the untyped fetch wrapper and storer registry
    #[arg(long)]
    pub untyped_rpc: bool,

    /// Bind a server function to a handler class (repeatable)
    #[arg(long = "handler", value_name = "FUNCTION=HANDLER")]
    pub handlers: Vec<String>,
}

impl GenerateArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            schema: self.schema.clone(),
            gen_internals: self.gen_internals,
            untyped_rpc: self.untyped_rpc,
            custom_impl_types: self.custom_impl_types.clone(),
            handlers: self.handlers.clone(),
        }
    }
}

pub fn run(base: GenSettings, args: &GenerateArgs) -> Result<()> {
    let settings = settings::apply(base, &args.overrides())?;

    let Some((generated, report)) = generate_into(&settings, args)? else {
        println!("No schema file configured; nothing generated");
        return Ok(());
    };

    println!(
        "Generated {} modules, {} server functions: {} files written, {} unchanged in {}",
        generated.modules.len(),
        generated.server_dispatch.cases.len(),
        report.written.len(),
        report.unchanged.len(),
        args.output.display()
    );
    Ok(())
}

/// Run the pass and write its units. `None` when no schema is configured.
pub fn generate_into(
    settings: &GenSettings,
    args: &GenerateArgs,
) -> Result<Option<(Generated, WriteReport)>> {
    let Some(generated) = generate_from_settings(settings, &default_passes())? else {
        tracing::info!("no schema file configured");
        return Ok(None);
    };

    let report = write_units(&args.output, &generated.units)
        .with_context(|| format!("Failed to write output to {}", args.output.display()))?;
    tracing::info!(
        written = report.written.len(),
        unchanged = report.unchanged.len(),
        "units written"
    );
    Ok(Some((generated, report)))
}
