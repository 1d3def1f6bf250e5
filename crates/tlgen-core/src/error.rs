//! Error types for schema loading and code generation

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generation operations
pub type GenResult<T> = Result<T, GenError>;

/// Stage that rejected a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// Schema file missing or unreadable
    Io,
    /// Schema document malformed
    Parse,
    /// Anonymous-argument elimination failed
    AnonymousArgs,
    /// Flattening pass failed
    Flattening,
    /// Final consistency check failed
    FinalCheck,
}

impl std::fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaErrorKind::Io => write!(f, "schema read error"),
            SchemaErrorKind::Parse => write!(f, "schema parse error"),
            SchemaErrorKind::AnonymousArgs => write!(f, "anonymous argument error"),
            SchemaErrorKind::Flattening => write!(f, "flattening error"),
            SchemaErrorKind::FinalCheck => write!(f, "schema check failed"),
        }
    }
}

/// Fatal schema error: aborts the whole generation pass
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
}

impl SchemaError {
    pub fn new(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn final_check(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::FinalCheck, message)
    }
}

/// Error type for code generation
#[derive(Error, Debug)]
pub enum GenError {
    /// Schema could not be loaded or normalized
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Invalid settings
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to write generated output
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    /// Returns a stable numeric code, usable as a process exit status
    pub fn error_code(&self) -> u32 {
        match self {
            GenError::Schema(e) => match e.kind {
                SchemaErrorKind::Io => 1,
                SchemaErrorKind::Parse => 2,
                SchemaErrorKind::AnonymousArgs => 3,
                SchemaErrorKind::Flattening => 4,
                SchemaErrorKind::FinalCheck => 5,
            },
            GenError::Config(_) => 6,
            GenError::Io { .. } => 7,
        }
    }

    /// Whether this error came from the schema itself
    pub fn is_schema_error(&self) -> bool {
        matches!(self, GenError::Schema(_))
    }
}

impl From<toml::de::Error> for GenError {
    fn from(err: toml::de::Error) -> Self {
        GenError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for GenError {
    fn from(err: serde_json::Error) -> Self {
        GenError::Config(err.to_string())
    }
}
