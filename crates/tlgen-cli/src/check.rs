//! `tlgen check`

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tlgen_core::{GenError, GenSettings, Schema, default_passes, load_schema, normalize};

/// Entity counts of a normalized schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub types: usize,
    pub constructors: usize,
    pub functions: usize,
    pub server_functions: usize,
    pub internal_functions: usize,
}

impl CheckSummary {
    pub fn of(schema: &Schema) -> Self {
        Self {
            types: schema.types.len(),
            constructors: schema.constructors().count(),
            functions: schema.functions.len(),
            server_functions: schema.functions.values().filter(|f| f.rpc_server).count(),
            internal_functions: schema.functions.values().filter(|f| f.internal).count(),
        }
    }
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} types, {} constructors, {} functions ({} server, {} internal)",
            self.types,
            self.constructors,
            self.functions,
            self.server_functions,
            self.internal_functions
        )
    }
}

/// Load and normalize the schema, failing on the first schema error.
pub fn check(path: &Path) -> Result<CheckSummary> {
    let mut schema = load_schema(path).map_err(GenError::from)?;
    normalize(&mut schema, &default_passes()).map_err(GenError::from)?;
    Ok(CheckSummary::of(&schema))
}

pub fn run(settings: &GenSettings, schema: Option<PathBuf>) -> Result<()> {
    let path = schema
        .or_else(|| settings.schema_file.clone())
        .context("No schema given: pass --schema or set schema_file in settings")?;

    let summary = check(&path)?;
    println!("✓ {} is valid: {summary}", path.display());
    Ok(())
}
