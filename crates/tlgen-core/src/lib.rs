//! tlgen-core - Schema model, settings, and error types
//!
//! This crate provides the foundational types for the tlgen schema compiler:
//! - [`Schema`] and its entities ([`Type`], [`Constructor`], [`Function`], [`TypeExpr`])
//! - [`Combinator`] trait shared by functions and constructors
//! - [`GenSettings`] for generation configuration
//! - [`SchemaError`] and [`GenError`] for error handling
//! - [`NormalizationPass`] pipeline consumed before code generation

mod config;
mod error;
mod loader;
mod normalize;
mod schema;

pub use config::{GenSettings, HandlerResolver};
pub use error::{GenError, GenResult, SchemaError, SchemaErrorKind};
pub use loader::{load_schema, parse_schema};
pub use normalize::{FinalCheck, NormalizationPass, ReplaceAnonymousArgs, default_passes, normalize};
pub use schema::{
    Builtin, Combinator, CombinatorKind, Constructor, Field, Function, Magic, Schema, Type,
    TypeExpr, TypeExprVisitor,
};

/// Type name that is never generated: the polymorphic query wrapper.
///
/// It is the only type carrying an open `!X` parameter, so it has no
/// fixed store/fetch shape.
pub const ENGINE_QUERY_TYPE: &str = "engine.Query";

/// Log levels accepted by settings and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(GenError::Config(format!("unknown log level: {other}"))),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Builtin, Combinator, CombinatorKind, Constructor, Field, Function, GenError, GenResult,
        GenSettings, LogLevel, Magic, Schema, SchemaError, SchemaErrorKind, Type, TypeExpr,
        TypeExprVisitor,
    };
}
