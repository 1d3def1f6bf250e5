//! Target object collection: which schema entities get generated, and where

use crate::context::CompilationContext;
use crate::module::ExternalTypes;
use crate::naming;
use std::collections::BTreeSet;
use tlgen_core::{Function, GenSettings, Schema};

/// Exclusion rules applied before module assignment.
#[derive(Debug, Clone, Copy)]
pub struct ExclusionPolicy<'a> {
    custom_impl_types: &'a BTreeSet<String>,
    custom_impl_header: &'a str,
    gen_tl_internals: bool,
}

impl<'a> ExclusionPolicy<'a> {
    pub fn from_settings(settings: &'a GenSettings) -> Self {
        Self {
            custom_impl_types: &settings.custom_impl_types,
            custom_impl_header: &settings.custom_impl_header,
            gen_tl_internals: settings.gen_tl_internals,
        }
    }

    /// Custom-implemented types and the query wrapper are never generated.
    pub fn excludes_type(&self, name: &str) -> bool {
        self.custom_impl_types.contains(name) || naming::is_query_wrapper(name)
    }

    pub fn excludes_function(&self, f: &Function) -> bool {
        f.internal && !self.gen_tl_internals
    }
}

impl ExternalTypes for ExclusionPolicy<'_> {
    fn external_header(&self, type_name: &str) -> Option<&str> {
        self.excludes_type(type_name)
            .then_some(self.custom_impl_header)
    }
}

/// Partition the schema into modules, recorded on the context.
pub fn collect_target_objects(ctx: &mut CompilationContext<'_>) {
    let schema = ctx.schema();
    let policy = ExclusionPolicy::from_settings(ctx.settings());
    let modules = ctx.modules_mut();

    for t in schema.types.values() {
        if policy.excludes_type(&t.name) {
            tracing::debug!(entity = %t.name, "type excluded from generation");
            continue;
        }
        modules.add_type(t, &policy);
    }

    for f in schema.functions.values() {
        if policy.excludes_function(f) {
            tracing::debug!(entity = %f.name, "internal function skipped");
            continue;
        }
        modules.add_function(f, &policy);
    }
}

/// Every server-eligible function of the schema, in name order.
///
/// Unlike module assignment this ignores exclusion rules: server dispatch
/// covers the full function set.
pub fn server_functions(schema: &Schema) -> impl Iterator<Item = &Function> {
    schema.functions.values().filter(|f| f.rpc_server)
}
