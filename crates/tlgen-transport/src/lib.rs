//! tlgen-transport - Wire format and reference runtime
//!
//! This crate provides:
//! - [`WireWriter`] and [`WireReader`] for the little-endian TL wire format
//! - [`Value`] and [`Record`], dynamic values of schema entities
//! - [`Evaluator`], which executes generated store/fetch IR directly
//! - [`MagicNameTable`] and [`StorerRegistry`], the process-wide lookup tables
//! - [`ServerDispatcher`] for inbound RPC requests
//!
//! The evaluator runs exactly the statements the renderer emits, so the
//! behavior of generated code can be checked without compiling it.

mod evaluator;
mod server;
mod tables;
mod value;
mod wire;

pub use evaluator::Evaluator;
pub use server::{QuerySink, RpcRequest, ServerDispatcher};
pub use tables::{MagicNameTable, Storer, StorerRegistry};
pub use value::{Record, Value};
pub use wire::{CodecError, MAYBE_ABSENT, MAYBE_PRESENT, MAX_STRING_LEN, WireReader, WireWriter};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CodecError, Evaluator, MagicNameTable, QuerySink, Record, RpcRequest, ServerDispatcher,
        StorerRegistry, Value, WireReader, WireWriter,
    };
}

#[cfg(test)]
mod test_support;
