//! Store/fetch generation.
//!
//! Every combinator (constructor or function) gets a store function writing
//! its magic, the field-mask when it has optional fields, then each field in
//! declared order; and a fetch function reading the mask and the fields in the
//! same order. The magic is read by whoever dispatches to the fetch: the owning
//! type's magic switch, or the server dispatcher for functions.
//!
//! Every type gets a store forwarding to its selected constructor and a fetch
//! switching on the magic read from the wire.
//!
//! Field type expressions become [`Codec`] trees through [`CodecBuilder`].
//! Named types are leaves: they delegate to the type's own codec functions,
//! which are generated once no matter how many fields reference them.

use crate::ir::{Codec, CodecFn, CodecKey, CodecKind, CodecOp, MagicCase, Stmt};
use indexmap::IndexMap;
use indexmap::map::Entry;
use tlgen_core::{Builtin, Combinator, CombinatorKind, Function, Type, TypeExpr, TypeExprVisitor};

/// Builds the [`Codec`] of a type expression.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodecBuilder;

impl CodecBuilder {
    pub fn build(ty: &TypeExpr) -> Codec {
        ty.accept(&mut CodecBuilder)
    }
}

impl TypeExprVisitor for CodecBuilder {
    type Output = Codec;

    fn visit_builtin(&mut self, builtin: Builtin) -> Codec {
        Codec::Builtin(builtin)
    }

    fn visit_named(&mut self, name: &str) -> Codec {
        Codec::Type(name.to_string())
    }

    fn visit_maybe(&mut self, inner: &TypeExpr) -> Codec {
        Codec::Maybe(Box::new(inner.accept(self)))
    }

    fn visit_vector(&mut self, inner: &TypeExpr) -> Codec {
        Codec::Vector(Box::new(inner.accept(self)))
    }

    fn visit_dictionary(&mut self, inner: &TypeExpr) -> Codec {
        Codec::Dictionary(Box::new(inner.accept(self)))
    }
}

fn combinator_kind(c: &impl Combinator) -> CodecKind {
    match c.kind() {
        CombinatorKind::Constructor => CodecKind::Constructor,
        CombinatorKind::Function => CodecKind::Function,
    }
}

fn field_stmts(c: &impl Combinator) -> impl Iterator<Item = Stmt> + '_ {
    c.fields().iter().map(|field| Stmt::Field {
        name: field.name.clone(),
        codec: CodecBuilder::build(&field.ty),
        mask_bit: field.mask_bit,
    })
}

/// Store of a combinator: magic, mask, fields.
pub fn combinator_store(c: &impl Combinator) -> CodecFn {
    let mut body = vec![Stmt::WriteMagic(c.magic())];
    if c.has_optional_fields() {
        body.push(Stmt::WriteFieldsMask);
    }
    body.extend(field_stmts(c));
    CodecFn {
        entity: c.name().to_string(),
        kind: combinator_kind(c),
        op: CodecOp::Store,
        body,
    }
}

/// Fetch of a combinator body: mask, fields. The magic is already consumed.
pub fn combinator_fetch(c: &impl Combinator) -> CodecFn {
    let mut body = Vec::with_capacity(c.fields().len() + 1);
    if c.has_optional_fields() {
        body.push(Stmt::ReadFieldsMask);
    }
    body.extend(field_stmts(c));
    CodecFn {
        entity: c.name().to_string(),
        kind: combinator_kind(c),
        op: CodecOp::Fetch,
        body,
    }
}

fn magic_cases(t: &Type) -> Vec<MagicCase> {
    t.constructors
        .iter()
        .map(|c| MagicCase {
            magic: c.magic,
            constructor: c.name.clone(),
        })
        .collect()
}

/// Store and fetch of a sum type
pub fn type_codecs(t: &Type) -> [CodecFn; 2] {
    let cases = magic_cases(t);
    [
        CodecFn {
            entity: t.name.clone(),
            kind: CodecKind::Type,
            op: CodecOp::Store,
            body: vec![Stmt::ForwardToVariant {
                cases: cases.clone(),
            }],
        },
        CodecFn {
            entity: t.name.clone(),
            kind: CodecKind::Type,
            op: CodecOp::Fetch,
            body: vec![Stmt::SwitchMagic { cases }],
        },
    ]
}

/// Store and fetch of a function's answer
pub fn function_result_codecs(f: &Function) -> [CodecFn; 2] {
    let codec = CodecBuilder::build(&f.result);
    [CodecOp::Store, CodecOp::Fetch].map(|op| CodecFn {
        entity: f.name.clone(),
        kind: CodecKind::FunctionResult,
        op,
        body: vec![Stmt::Result(codec.clone())],
    })
}

/// Codec functions keyed by identity; each is kept once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodecSet {
    fns: IndexMap<CodecKey, CodecFn>,
}

impl CodecSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless a function with the same key exists. Returns whether it was added.
    pub fn insert(&mut self, codec: CodecFn) -> bool {
        match self.fns.entry(codec.key()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(codec);
                true
            }
        }
    }

    pub fn add_type(&mut self, t: &Type) {
        for codec in type_codecs(t) {
            self.insert(codec);
        }
        for c in &t.constructors {
            self.insert(combinator_store(c));
            self.insert(combinator_fetch(c));
        }
    }

    pub fn add_function(&mut self, f: &Function) {
        self.insert(combinator_store(f));
        self.insert(combinator_fetch(f));
        for codec in function_result_codecs(f) {
            self.insert(codec);
        }
    }

    pub fn get(&self, key: &CodecKey) -> Option<&CodecFn> {
        self.fns.get(key)
    }

    pub fn len(&self) -> usize {
        self.fns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }

    /// Functions in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &CodecFn> {
        self.fns.values()
    }
}

impl IntoIterator for CodecSet {
    type Item = CodecFn;
    type IntoIter = indexmap::map::IntoValues<CodecKey, CodecFn>;

    fn into_iter(self) -> Self::IntoIter {
        self.fns.into_values()
    }
}

impl Extend<CodecFn> for CodecSet {
    fn extend<I: IntoIterator<Item = CodecFn>>(&mut self, iter: I) {
        for codec in iter {
            self.insert(codec);
        }
    }
}

#[cfg(test)]
#[path = "store_fetch/store_fetch_tests.rs"]
mod store_fetch_tests;
