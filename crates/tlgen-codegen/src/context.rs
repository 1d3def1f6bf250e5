//! Per-pass compilation state

use crate::ir::ConstStrings;
use crate::module::ModuleRegistry;
use tlgen_core::{GenSettings, HandlerResolver, Schema};

/// Everything one generation pass shares between its stages.
///
/// Created at the start of a pass and dropped with its results; nothing
/// outlives the pass.
pub struct CompilationContext<'s> {
    schema: &'s Schema,
    settings: &'s GenSettings,
    resolver: &'s dyn HandlerResolver,
    modules: ModuleRegistry<'s>,
    const_strings: ConstStrings,
}

impl<'s> CompilationContext<'s> {
    /// Context resolving handlers through the settings' own bindings
    pub fn new(schema: &'s Schema, settings: &'s GenSettings) -> Self {
        Self::with_resolver(schema, settings, settings)
    }

    pub fn with_resolver(
        schema: &'s Schema,
        settings: &'s GenSettings,
        resolver: &'s dyn HandlerResolver,
    ) -> Self {
        Self {
            schema,
            settings,
            resolver,
            modules: ModuleRegistry::new(),
            const_strings: ConstStrings::new(),
        }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn settings(&self) -> &'s GenSettings {
        self.settings
    }

    pub fn resolver(&self) -> &'s dyn HandlerResolver {
        self.resolver
    }

    pub fn modules(&self) -> &ModuleRegistry<'s> {
        &self.modules
    }

    pub(crate) fn modules_mut(&mut self) -> &mut ModuleRegistry<'s> {
        &mut self.modules
    }

    /// Intern a schema string and return its identifier
    pub fn register_const_str(&mut self, value: &str) -> String {
        self.const_strings.register(value)
    }

    pub fn const_strings(&self) -> &ConstStrings {
        &self.const_strings
    }

    /// Consume the context, keeping what outlives collection
    pub fn into_parts(self) -> (ModuleRegistry<'s>, ConstStrings) {
        (self.modules, self.const_strings)
    }
}
