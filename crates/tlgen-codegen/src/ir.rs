//! Intermediate representation of generated code.
//!
//! Generators produce these values; renderers turn them into text and the
//! reference runtime executes them directly. Nothing here knows about the
//! concrete syntax of any target language.
//!
//! # Structure
//!
//! - [`Decl`]: one structural declaration per generated entity
//! - [`CodecFn`]: one store or fetch function, a list of [`Stmt`]s
//! - [`Codec`]: the composable encoding of a single type expression
//! - [`ServerDispatch`], [`StorerTable`], [`MagicTable`]: global dispatch data
//! - [`ConstStrings`]: schema strings interned for the runtime
//!
//! Schema names are kept verbatim; renderers apply target naming.

use crate::module::Include;
use std::collections::BTreeSet;
use tlgen_core::{Builtin, Magic, TypeExpr};

/// A structural declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// A constructor or function: a record of fields
    Struct(StructDecl),
    /// A sum type holding exactly one of its constructors
    Variant(VariantDecl),
}

impl Decl {
    /// Schema name of the declared entity
    pub fn entity(&self) -> &str {
        match self {
            Decl::Struct(s) => &s.entity,
            Decl::Variant(v) => &v.entity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub entity: String,
    pub kind: CodecKind,
    pub magic: Magic,
    pub fields: Vec<FieldDecl>,
    /// Answer type, for functions only
    pub result: Option<TypeExpr>,
}

impl StructDecl {
    pub fn has_optional_fields(&self) -> bool {
        self.fields.iter().any(|f| f.mask_bit.is_some())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub mask_bit: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantDecl {
    pub entity: String,
    pub cases: Vec<MagicCase>,
}

/// Which entity a codec function belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodecKind {
    Type,
    Constructor,
    Function,
    /// Answer of a function
    FunctionResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodecOp {
    Store,
    Fetch,
}

/// Identity of a codec function; unique within one generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodecKey {
    pub kind: CodecKind,
    pub entity: String,
    pub op: CodecOp,
}

impl CodecKey {
    pub fn new(kind: CodecKind, entity: impl Into<String>, op: CodecOp) -> Self {
        Self {
            kind,
            entity: entity.into(),
            op,
        }
    }
}

/// A generated store or fetch function.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecFn {
    pub entity: String,
    pub kind: CodecKind,
    pub op: CodecOp,
    pub body: Vec<Stmt>,
}

impl CodecFn {
    pub fn key(&self) -> CodecKey {
        CodecKey::new(self.kind, self.entity.clone(), self.op)
    }

    /// Magic written by this function, if it is a boxed store
    pub fn written_magic(&self) -> Option<Magic> {
        self.body.iter().find_map(|stmt| match stmt {
            Stmt::WriteMagic(magic) => Some(*magic),
            _ => None,
        })
    }
}

/// One statement of a codec function body.
///
/// Store bodies and fetch bodies use disjoint subsets, except for
/// [`Stmt::Field`] and [`Stmt::Result`] which mean "store" or "fetch"
/// according to the enclosing [`CodecFn::op`].
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Write the combinator magic
    WriteMagic(Magic),
    /// Compute the field-mask from field presence and write it
    WriteFieldsMask,
    /// Read the field-mask that guards the following fields
    ReadFieldsMask,
    /// Store or fetch one field; optional fields only when their bit is set
    Field {
        name: String,
        codec: Codec,
        mask_bit: Option<u8>,
    },
    /// Store the constructor currently held by a sum-type value
    ForwardToVariant { cases: Vec<MagicCase> },
    /// Read a magic and fetch the body of the matching constructor
    SwitchMagic { cases: Vec<MagicCase> },
    /// Store or fetch a function answer
    Result(Codec),
}

/// One arm of a magic switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicCase {
    pub magic: Magic,
    pub constructor: String,
}

/// Encoding of one type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Codec {
    Builtin(Builtin),
    /// Boxed schema type, delegated to that type's own codec functions
    Type(String),
    Maybe(Box<Codec>),
    Vector(Box<Codec>),
    Dictionary(Box<Codec>),
}

impl Codec {
    /// Schema types this codec delegates to
    pub fn referenced_types(&self) -> Vec<&str> {
        match self {
            Codec::Builtin(_) => Vec::new(),
            Codec::Type(name) => vec![name.as_str()],
            Codec::Maybe(inner) | Codec::Vector(inner) | Codec::Dictionary(inner) => {
                inner.referenced_types()
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Global dispatch data
// ----------------------------------------------------------------------------

/// Inbound request switch, one case per bound server function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerDispatch {
    pub cases: Vec<DispatchCase>,
    pub includes: BTreeSet<Include>,
}

impl ServerDispatch {
    pub fn case_for(&self, magic: Magic) -> Option<&DispatchCase> {
        self.cases.iter().find(|c| c.magic == magic)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCase {
    pub magic: Magic,
    pub function: String,
    pub handler: String,
}

/// Name-keyed table of outbound function storers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorerTable {
    pub entries: Vec<StorerEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorerEntry {
    pub function: String,
    /// Interned-string identifier of the function name
    pub name_ident: String,
    /// Precomputed hash of the function name
    pub hash: i64,
}

/// Parallel magic and name arrays covering every function.
///
/// `ids[i]` is the magic of the function named `names[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MagicTable {
    pub ids: Vec<Magic>,
    pub names: Vec<String>,
}

impl MagicTable {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Magic, &str)> {
        self.ids.iter().copied().zip(self.names.iter().map(String::as_str))
    }
}

/// Deduplicated, sorted set of strings referenced by generated code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstStrings {
    values: BTreeSet<String>,
}

impl ConstStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `value` and return its identifier.
    pub fn register(&mut self, value: &str) -> String {
        if !self.values.contains(value) {
            self.values.insert(value.to_string());
        }
        crate::naming::const_str_ident(value)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}
