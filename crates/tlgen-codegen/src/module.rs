//! Modules: namespace-scoped bundles of generated entities

use crate::naming;
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};
use tlgen_core::{Builtin, Combinator, Function, Type, TypeExpr, TypeExprVisitor};

/// A dependency of a generated unit.
///
/// Headers sort before modules, each group by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Include {
    /// External header, e.g. the one implementing custom types
    Header(String),
    /// Another generated module
    Module(String),
}

impl Include {
    /// Path as written in an include directive
    pub fn path(&self) -> String {
        match self {
            Include::Header(header) => header.clone(),
            Include::Module(module) => format!("tl/{module}.h"),
        }
    }
}

/// A named bundle of the types and functions sharing a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module<'s> {
    pub name: String,
    pub target_types: IndexMap<&'s str, &'s Type>,
    pub target_functions: IndexMap<&'s str, &'s Function>,
    pub deps: BTreeSet<Include>,
}

impl<'s> Module<'s> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_types: IndexMap::new(),
            target_functions: IndexMap::new(),
            deps: BTreeSet::new(),
        }
    }

    pub fn has_functions(&self) -> bool {
        !self.target_functions.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.target_types.is_empty() && self.target_functions.is_empty()
    }

    /// Names of every entity in this module, types first
    pub fn entity_names(&self) -> impl Iterator<Item = &'s str> + '_ {
        self.target_types
            .keys()
            .chain(self.target_functions.keys())
            .copied()
    }
}

/// Decides which references become header includes instead of module includes.
pub trait ExternalTypes {
    /// Header supplying `type_name`, when the type is not generated
    fn external_header(&self, type_name: &str) -> Option<&str>;
}

/// All modules of one generation pass, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRegistry<'s> {
    modules: BTreeMap<String, Module<'s>>,
    modules_with_functions: BTreeSet<String>,
}

impl<'s> ModuleRegistry<'s> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a type in its module and record what its constructors reference.
    pub fn add_type(&mut self, t: &'s Type, external: &dyn ExternalTypes) {
        let module = self.module_for(&t.name);
        if module.target_types.insert(t.name.as_str(), t).is_some() {
            return;
        }
        let mut deps = DependencyCollector::new(&module.name, external);
        for c in &t.constructors {
            deps.visit_fields(c);
        }
        module.deps.extend(deps.finish());
        tracing::debug!(module = %module.name, entity = %t.name, "assigned type");
    }

    /// Place a function in its module and record what its fields and answer reference.
    pub fn add_function(&mut self, f: &'s Function, external: &dyn ExternalTypes) {
        let module = self.module_for(&f.name);
        if module.target_functions.insert(f.name.as_str(), f).is_some() {
            return;
        }
        let mut deps = DependencyCollector::new(&module.name, external);
        deps.visit_fields(f);
        f.result.accept(&mut deps);
        module.deps.extend(deps.finish());
        let name = module.name.clone();
        tracing::debug!(module = %name, entity = %f.name, "assigned function");
        self.modules_with_functions.insert(name);
    }

    fn module_for(&mut self, entity: &str) -> &mut Module<'s> {
        let name = naming::module_name(entity);
        self.modules
            .entry(name.to_string())
            .or_insert_with(|| Module::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&Module<'s>> {
        self.modules.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module<'s>> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn modules_with_functions(&self) -> &BTreeSet<String> {
        &self.modules_with_functions
    }

    /// Functions of every module that has any, module by module
    pub fn target_functions(&self) -> impl Iterator<Item = &'s Function> + '_ {
        self.modules_with_functions
            .iter()
            .filter_map(|name| self.modules.get(name))
            .flat_map(|m| m.target_functions.values().copied())
    }
}

/// Walks type expressions and records the includes they need.
struct DependencyCollector<'a> {
    module: &'a str,
    external: &'a dyn ExternalTypes,
    deps: BTreeSet<Include>,
}

impl<'a> DependencyCollector<'a> {
    fn new(module: &'a str, external: &'a dyn ExternalTypes) -> Self {
        Self {
            module,
            external,
            deps: BTreeSet::new(),
        }
    }

    fn visit_fields(&mut self, c: &impl Combinator) {
        for field in c.fields() {
            field.ty.accept(self);
        }
    }

    fn finish(self) -> BTreeSet<Include> {
        self.deps
    }
}

impl TypeExprVisitor for DependencyCollector<'_> {
    type Output = ();

    fn visit_builtin(&mut self, _builtin: Builtin) {}

    fn visit_named(&mut self, name: &str) {
        if let Some(header) = self.external.external_header(name) {
            self.deps.insert(Include::Header(header.to_string()));
            return;
        }
        let module = naming::module_name(name);
        if module != self.module {
            self.deps.insert(Include::Module(module.to_string()));
        }
    }

    fn visit_maybe(&mut self, inner: &TypeExpr) {
        inner.accept(self)
    }

    fn visit_vector(&mut self, inner: &TypeExpr) {
        inner.accept(self)
    }

    fn visit_dictionary(&mut self, inner: &TypeExpr) {
        inner.accept(self)
    }
}
