//! The generation pass: normalize, collect, build IR, render

use crate::collector::collect_target_objects;
use crate::constants::{ModuleConstants, check_identifiers, module_constants};
use crate::context::CompilationContext;
use crate::decl::module_decls;
use crate::dispatch;
use crate::ir::{CodecFn, ConstStrings, Decl, MagicTable, ServerDispatch, StorerTable};
use crate::module::{Include, Module};
use crate::render::CppRenderer;
use crate::store_fetch::CodecSet;
use crate::writer::{OutputUnit, render_units};
use std::collections::BTreeSet;
use std::path::Path;
use tlgen_core::{
    GenResult, GenSettings, HandlerResolver, NormalizationPass, Schema, load_schema, normalize,
};

/// Everything generated for one module
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleIr {
    pub name: String,
    pub includes: BTreeSet<Include>,
    pub decls: Vec<Decl>,
    pub codecs: CodecSet,
    pub constants: ModuleConstants,
}

pub fn module_ir(module: &Module<'_>) -> ModuleIr {
    let mut codecs = CodecSet::new();
    for t in module.target_types.values() {
        codecs.add_type(t);
    }
    for f in module.target_functions.values() {
        codecs.add_function(f);
    }
    ModuleIr {
        name: module.name.clone(),
        includes: module.deps.clone(),
        decls: module_decls(module),
        codecs,
        constants: module_constants(module),
    }
}

/// Result of one generation pass.
#[derive(Debug, Clone)]
pub struct Generated {
    pub modules: Vec<ModuleIr>,
    pub modules_with_functions: BTreeSet<String>,
    pub server_dispatch: ServerDispatch,
    /// Present only when untyped RPC is in use
    pub storers: Option<StorerTable>,
    pub magic_table: MagicTable,
    pub const_strings: ConstStrings,
    pub units: Vec<OutputUnit>,
}

impl Generated {
    pub fn module(&self, name: &str) -> Option<&ModuleIr> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Codec functions of every module
    pub fn codecs(&self) -> impl Iterator<Item = &CodecFn> {
        self.modules.iter().flat_map(|m| m.codecs.iter())
    }

    pub fn unit(&self, path: impl AsRef<Path>) -> Option<&OutputUnit> {
        let path = path.as_ref();
        self.units.iter().find(|u| u.path == path)
    }
}

/// Run a full generation pass, resolving handlers from `settings`.
pub fn generate(
    schema: Schema,
    settings: &GenSettings,
    passes: &[Box<dyn NormalizationPass>],
) -> GenResult<Generated> {
    generate_with_resolver(schema, settings, settings, passes)
}

/// Run a full generation pass with an external handler resolver.
///
/// Any normalization failure, or two combinators mapping to one generated
/// identifier, aborts the pass before anything is rendered.
pub fn generate_with_resolver(
    mut schema: Schema,
    settings: &GenSettings,
    resolver: &dyn HandlerResolver,
    passes: &[Box<dyn NormalizationPass>],
) -> GenResult<Generated> {
    normalize(&mut schema, passes)?;

    let mut ctx = CompilationContext::with_resolver(&schema, settings, resolver);
    collect_target_objects(&mut ctx);

    let modules: Vec<ModuleIr> = ctx.modules().iter().map(module_ir).collect();
    check_identifiers(modules.iter().map(|m| &m.constants))?;
    let modules_with_functions = ctx.modules().modules_with_functions().clone();
    let server_dispatch = dispatch::server_dispatch(&ctx);
    let storers = settings
        .untyped_rpc_used
        .then(|| dispatch::storer_table(&mut ctx));
    let magic_table = dispatch::magic_table(&schema);
    let (_, const_strings) = ctx.into_parts();

    let mut generated = Generated {
        modules,
        modules_with_functions,
        server_dispatch,
        storers,
        magic_table,
        const_strings,
        units: Vec::new(),
    };
    generated.units = render_units(&generated, &CppRenderer::new(&settings.runtime_headers));

    tracing::info!(
        modules = generated.modules.len(),
        server_functions = generated.server_dispatch.cases.len(),
        units = generated.units.len(),
        "generation pass complete"
    );
    Ok(generated)
}

/// Load the configured schema and generate it.
///
/// Returns `None` when no schema file is configured.
pub fn generate_from_settings(
    settings: &GenSettings,
    passes: &[Box<dyn NormalizationPass>],
) -> GenResult<Option<Generated>> {
    let Some(path) = &settings.schema_file else {
        tracing::debug!("no schema file configured, nothing to generate");
        return Ok(None);
    };
    let schema = load_schema(path)?;
    generate(schema, settings, passes).map(Some)
}
