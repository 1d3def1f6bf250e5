//! Generation settings

use crate::error::{GenError, GenResult};
use crate::schema::Function;
use crate::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Settings consumed by a generation pass
///
/// Usually loaded from a `tlgen.toml` file and then overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenSettings {
    /// Schema to compile. When unset, generation is skipped entirely.
    pub schema_file: Option<PathBuf>,

    /// Also generate functions marked internal
    pub gen_tl_internals: bool,

    /// Types whose store/fetch is supplied by the runtime instead of generated
    pub custom_impl_types: BTreeSet<String>,

    /// Whether untyped (dynamic) RPC calls exist in the host program
    ///
    /// Gates emission of the fetch wrapper and the storer registry.
    pub untyped_rpc_used: bool,

    /// Header included first by every generated unit
    pub runtime_headers: String,

    /// Header providing store/fetch for custom-implemented types
    pub custom_impl_header: String,

    /// Function name to handler class bindings for server dispatch
    pub handlers: BTreeMap<String, String>,

    /// Log level for the generation pass
    pub log_level: LogLevel,
}

fn default_runtime_headers() -> String {
    "runtime-headers.h".to_string()
}

fn default_custom_impl_header() -> String {
    "tl/tl_builtins.h".to_string()
}

impl Default for GenSettings {
    fn default() -> Self {
        Self {
            schema_file: None,
            gen_tl_internals: false,
            custom_impl_types: BTreeSet::new(),
            untyped_rpc_used: false,
            runtime_headers: default_runtime_headers(),
            custom_impl_header: default_custom_impl_header(),
            handlers: BTreeMap::new(),
            log_level: LogLevel::default(),
        }
    }
}

impl GenSettings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> GenResult<Self> {
        let settings: GenSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from JSON bytes; empty input yields defaults
    pub fn from_json(bytes: &[u8]) -> GenResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        let settings: GenSettings = serde_json::from_slice(bytes)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> GenResult<()> {
        if self.runtime_headers.trim().is_empty() {
            return Err(GenError::Config("runtime_headers cannot be empty".into()));
        }
        if self.custom_impl_header.trim().is_empty() {
            return Err(GenError::Config("custom_impl_header cannot be empty".into()));
        }
        if let Some((name, _)) = self.handlers.iter().find(|(_, class)| class.trim().is_empty()) {
            return Err(GenError::Config(format!(
                "handler binding for `{name}` cannot be empty"
            )));
        }
        Ok(())
    }

    /// Set the schema path
    pub fn with_schema_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_file = Some(path.into());
        self
    }

    /// Bind a function to a handler class
    pub fn with_handler(mut self, function: impl Into<String>, class: impl Into<String>) -> Self {
        self.handlers.insert(function.into(), class.into());
        self
    }

    /// Mark a type as implemented by the runtime
    pub fn with_custom_impl_type(mut self, name: impl Into<String>) -> Self {
        self.custom_impl_types.insert(name.into());
        self
    }

    pub fn is_custom_impl_type(&self, name: &str) -> bool {
        self.custom_impl_types.contains(name)
    }
}

/// Resolves the handler class a function is bound to.
///
/// Class binding belongs to the host compiler; generation only needs to know
/// whether a binding exists and what it is called.
pub trait HandlerResolver {
    fn handler_for(&self, function: &Function) -> Option<String>;
}

impl HandlerResolver for GenSettings {
    fn handler_for(&self, function: &Function) -> Option<String> {
        self.handlers.get(&function.name).cloned()
    }
}

impl HandlerResolver for BTreeMap<String, String> {
    fn handler_for(&self, function: &Function) -> Option<String> {
        self.get(&function.name).cloned()
    }
}
