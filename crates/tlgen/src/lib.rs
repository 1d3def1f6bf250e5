//! # tlgen
//!
//! A compiler from TL schemas to typed serialization code.
//!
//! Given a schema of sum types, constructors and RPC functions, tlgen produces:
//! - per-namespace modules of declarations and store/fetch functions
//! - an inbound server dispatch switch over function magics
//! - a name-keyed storer registry for untyped outbound calls
//! - magic/name lookup tables and an interned string table
//!
//! ## Quick Start
//!
//! ```ignore
//! use tlgen::prelude::*;
//!
//! let settings = GenSettings::from_file("tlgen.toml")?;
//! if let Some(generated) = generate_from_settings(&settings, &default_passes())? {
//!     write_units(Path::new("out"), &generated.units)?;
//! }
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`tlgen_core`] - Schema model, settings, normalization, errors
//! - [`tlgen_codegen`] - Collection, IR generators, C++ renderer, writer
//! - [`tlgen_transport`] - Wire format and reference runtime

// Re-export core types
pub use tlgen_core::{
    Builtin, Combinator, Constructor, ENGINE_QUERY_TYPE, Field, Function, GenError, GenResult,
    GenSettings, HandlerResolver, LogLevel, Magic, NormalizationPass, Schema, SchemaError,
    SchemaErrorKind, Type, TypeExpr, default_passes, load_schema, normalize, parse_schema,
};

// Re-export the generation pipeline
pub use tlgen_codegen::{
    CompilationContext, CppRenderer, Generated, ModuleRegistry, OutputUnit, Renderer, WriteReport,
    collect_target_objects, generate, generate_from_settings, generate_with_resolver, write_units,
};

// Re-export the runtime
pub use tlgen_transport::{
    CodecError, Evaluator, MagicNameTable, QuerySink, Record, RpcRequest, ServerDispatcher,
    StorerRegistry, Value, WireReader, WireWriter,
};

pub use tracing;

/// Prelude module for convenient imports.
///
/// Use `use tlgen::prelude::*;` to import commonly used types.
pub mod prelude {
    // Schema and settings
    pub use crate::{
        Combinator, GenError, GenResult, GenSettings, Schema, SchemaError, default_passes,
        load_schema,
    };

    // Generation
    pub use crate::{Generated, generate, generate_from_settings, write_units};

    // Runtime
    pub use crate::{Evaluator, Record, ServerDispatcher, Value, WireReader, WireWriter};

    pub use std::path::Path;
}
