//! Structural declarations, one per generated entity

use crate::ir::{CodecKind, Decl, FieldDecl, MagicCase, StructDecl, VariantDecl};
use crate::module::Module;
use tlgen_core::{Combinator, Constructor, Function, Type};

fn fields_of(c: &impl Combinator) -> Vec<FieldDecl> {
    c.fields()
        .iter()
        .map(|f| FieldDecl {
            name: f.name.clone(),
            ty: f.ty.clone(),
            mask_bit: f.mask_bit,
        })
        .collect()
}

pub fn constructor_decl(c: &Constructor) -> Decl {
    Decl::Struct(StructDecl {
        entity: c.name.clone(),
        kind: CodecKind::Constructor,
        magic: c.magic,
        fields: fields_of(c),
        result: None,
    })
}

pub fn function_decl(f: &Function) -> Decl {
    Decl::Struct(StructDecl {
        entity: f.name.clone(),
        kind: CodecKind::Function,
        magic: f.magic,
        fields: fields_of(f),
        result: Some(f.result.clone()),
    })
}

pub fn type_decl(t: &Type) -> Decl {
    Decl::Variant(VariantDecl {
        entity: t.name.clone(),
        cases: t
            .constructors
            .iter()
            .map(|c| MagicCase {
                magic: c.magic,
                constructor: c.name.clone(),
            })
            .collect(),
    })
}

/// Declarations of a module: each type's constructors, then the type, then functions.
pub fn module_decls(module: &Module<'_>) -> Vec<Decl> {
    let mut decls = Vec::new();
    for t in module.target_types.values() {
        decls.extend(t.constructors.iter().map(constructor_decl));
        decls.push(type_decl(t));
    }
    decls.extend(module.target_functions.values().map(|f| function_decl(f)));
    decls
}
