//! tlgen-codegen - Code generation for TL schemas
//!
//! A generation pass runs in four stages:
//!
//! ```text
//! Schema
//!    ↓
//!  [normalize]            tlgen-core passes
//!    ↓
//!  [collect]              modules + dependencies
//!    ↓
//!  [decl / store_fetch]   per-module IR
//!  [dispatch / constants] global IR
//!    ↓
//!  [render]               output units
//! ```
//!
//! The IR in [`ir`] is the contract between generation and rendering; the
//! reference runtime in `tlgen-transport` executes it directly.

pub mod collector;
pub mod constants;
pub mod context;
pub mod decl;
pub mod dispatch;
mod generate;
pub mod ir;
pub mod module;
pub mod naming;
pub mod render;
pub mod store_fetch;
pub mod writer;

pub use collector::{ExclusionPolicy, collect_target_objects};
pub use context::CompilationContext;
pub use generate::{
    Generated, ModuleIr, generate, generate_from_settings, generate_with_resolver, module_ir,
};
pub use module::{Include, Module, ModuleRegistry};
pub use render::{CppRenderer, Renderer};
pub use store_fetch::{CodecBuilder, CodecSet};
pub use writer::{OutputUnit, WriteReport, write_units};

#[cfg(test)]
mod test_support;
