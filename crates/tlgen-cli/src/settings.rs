//! Settings file plus command-line overrides

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tlgen_core::GenSettings;

/// Default settings file, read when present and no `--config` is given
pub const DEFAULT_CONFIG: &str = "tlgen.toml";

/// Load settings from `path`, or from `tlgen.toml` if it exists, or defaults.
pub fn load(path: Option<&Path>) -> Result<GenSettings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None if Path::new(DEFAULT_CONFIG).is_file() => PathBuf::from(DEFAULT_CONFIG),
        None => return Ok(GenSettings::new()),
    };
    GenSettings::from_file(&path)
        .with_context(|| format!("Failed to load settings: {}", path.display()))
}

/// Flags that override the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub schema: Option<PathBuf>,
    pub gen_internals: bool,
    pub untyped_rpc: bool,
    pub custom_impl_types: Vec<String>,
    /// `function=Handler` pairs
    pub handlers: Vec<String>,
}

/// Apply `overrides` on top of `base`. Flags only ever switch features on.
pub fn apply(mut base: GenSettings, overrides: &Overrides) -> Result<GenSettings> {
    if let Some(schema) = &overrides.schema {
        base.schema_file = Some(schema.clone());
    }
    base.gen_tl_internals |= overrides.gen_internals;
    base.untyped_rpc_used |= overrides.untyped_rpc;
    base.custom_impl_types
        .extend(overrides.custom_impl_types.iter().cloned());
    for binding in &overrides.handlers {
        let (function, handler) = binding
            .split_once('=')
            .with_context(|| format!("Invalid handler binding `{binding}`, expected FUNCTION=HANDLER"))?;
        base.handlers
            .insert(function.trim().to_string(), handler.trim().to_string());
    }
    base.validate()?;
    Ok(base)
}
