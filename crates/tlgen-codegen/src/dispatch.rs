//! RPC dispatch and lookup table generation.
//!
//! All three tables are built from the full function set rather than one
//! module at a time:
//!
//! - [`server_dispatch`]: one switch case per server function bound to a handler
//! - [`storer_table`]: name-keyed storers of every generated function
//! - [`magic_table`]: parallel magic and name arrays of every schema function

use crate::collector::ExclusionPolicy;
use crate::context::CompilationContext;
use crate::ir::{DispatchCase, MagicTable, ServerDispatch, StorerEntry, StorerTable};
use crate::module::Include;
use crate::{collector, naming};
use tlgen_core::{Function, Schema};

/// Header every dispatch unit includes so it compiles with no server functions
pub const BASELINE_INCLUDE: &str = "tl/common.h";

/// Name reported for a magic that matches no function
pub const UNKNOWN_MAGIC_NAME: &str = "__unknown__";

/// Hash of a function name as stored in the storer table.
///
/// CRC-32 of the UTF-8 bytes, widened to `i64`.
pub fn name_hash(name: &str) -> i64 {
    i64::from(crc32fast::hash(name.as_bytes()))
}

/// Inbound dispatch over server functions with a bound handler.
///
/// A server function without a binding is assumed unused in this build and
/// left out without an error. So is one excluded from generation, since its
/// fetch code never exists.
pub fn server_dispatch(ctx: &CompilationContext<'_>) -> ServerDispatch {
    let mut dispatch = ServerDispatch::default();
    dispatch
        .includes
        .insert(Include::Header(BASELINE_INCLUDE.to_string()));

    let policy = ExclusionPolicy::from_settings(ctx.settings());
    for f in collector::server_functions(ctx.schema()) {
        if policy.excludes_function(f) {
            tracing::debug!(function = %f.name, "server function is not generated, skipped");
            continue;
        }
        let Some(handler) = ctx.resolver().handler_for(f) else {
            tracing::debug!(function = %f.name, "server function has no handler, skipped");
            continue;
        };
        dispatch
            .includes
            .insert(Include::Module(naming::module_name(&f.name).to_string()));
        dispatch.cases.push(DispatchCase {
            magic: f.magic,
            function: f.name.clone(),
            handler,
        });
    }
    dispatch
}

/// Storers of every function that has a generated module.
///
/// Interns each function name in the context's string table.
pub fn storer_table(ctx: &mut CompilationContext<'_>) -> StorerTable {
    let functions: Vec<&Function> = ctx.modules().target_functions().collect();
    let entries = functions
        .into_iter()
        .map(|f| StorerEntry {
            function: f.name.clone(),
            name_ident: ctx.register_const_str(&f.name),
            hash: name_hash(&f.name),
        })
        .collect();
    StorerTable { entries }
}

/// Magic and name arrays over every schema function, ordered by magic.
pub fn magic_table(schema: &Schema) -> MagicTable {
    let mut functions: Vec<&Function> = schema.functions.values().collect();
    functions.sort_by_key(|f| f.magic);
    MagicTable {
        ids: functions.iter().map(|f| f.magic).collect(),
        names: functions.iter().map(|f| f.name.clone()).collect(),
    }
}

#[cfg(test)]
#[path = "dispatch/dispatch_tests.rs"]
mod dispatch_tests;
