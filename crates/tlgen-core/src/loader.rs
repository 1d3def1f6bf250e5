//! Schema loading from the JSON schema description

use crate::error::{SchemaError, SchemaErrorKind};
use crate::schema::{Function, Schema, Type};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    #[serde(default)]
    types: Vec<Type>,

    #[serde(default)]
    functions: Vec<Function>,
}

/// Load a schema file from disk.
///
/// A missing or unreadable file and a malformed document are both fatal.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Schema, SchemaError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        SchemaError::new(
            SchemaErrorKind::Io,
            format!("error while reading {}: {e}", path.display()),
        )
    })?;

    let schema = parse_schema(&content)?;
    tracing::debug!(
        path = %path.display(),
        types = schema.types.len(),
        functions = schema.functions.len(),
        "loaded schema"
    );
    Ok(schema)
}

/// Parse a schema document.
pub fn parse_schema(content: &str) -> Result<Schema, SchemaError> {
    let file: SchemaFile = serde_json::from_str(content)
        .map_err(|e| SchemaError::new(SchemaErrorKind::Parse, e.to_string()))?;
    Schema::from_parts(file.types, file.functions)
}
