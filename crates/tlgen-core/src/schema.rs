//! In-memory schema graph consumed by the code generator.
//!
//! A schema is a set of named sum [`Type`]s, each owning its [`Constructor`]
//! variants, plus the RPC entry-point [`Function`]s. Constructors and
//! functions share the [`Combinator`] role: both are magic-tagged, carry an
//! ordered field list, and get identical store/fetch generation.
//!
//! Field types are [`TypeExpr`] trees over a closed set of variants. Code that
//! needs to walk them implements [`TypeExprVisitor`].

use crate::error::{SchemaError, SchemaErrorKind};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;

/// 32-bit identifier of a constructor or function
pub type Magic = u32;

/// Primitive types implemented directly by the wire runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Builtin {
    /// 4-byte signed integer.
    Int,
    /// 8-byte signed integer.
    Long,
    /// 8-byte IEEE float.
    Double,
    /// Length-prefixed, 4-byte padded byte string.
    String,
    /// Unsigned 32-bit natural (`#`).
    Nat,
    /// Zero-width marker; only its presence carries information.
    True,
}

impl Builtin {
    /// Resolve a schema spelling (`int`, `#`, `true`, ...) to a builtin.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Builtin::Int),
            "long" => Some(Builtin::Long),
            "double" => Some(Builtin::Double),
            "string" => Some(Builtin::String),
            "#" | "nat" => Some(Builtin::Nat),
            "true" => Some(Builtin::True),
            _ => None,
        }
    }

    /// Schema spelling of the builtin
    pub fn tl_name(&self) -> &'static str {
        match self {
            Builtin::Int => "int",
            Builtin::Long => "long",
            Builtin::Double => "double",
            Builtin::String => "string",
            Builtin::Nat => "#",
            Builtin::True => "true",
        }
    }
}

/// Type expression describing the shape of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// Wire primitive.
    Builtin(Builtin),
    /// Reference to a schema type by name; stored boxed (magic + body).
    Named(String),
    /// Optional-presence wrapper.
    Maybe(Box<TypeExpr>),
    /// Count-prefixed array.
    Vector(Box<TypeExpr>),
    /// Count-prefixed array of string-keyed entries.
    Dictionary(Box<TypeExpr>),
}

impl TypeExpr {
    /// Shorthand for a named type reference
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    /// Shorthand for `Maybe inner`
    pub fn maybe(inner: TypeExpr) -> Self {
        TypeExpr::Maybe(Box::new(inner))
    }

    /// Shorthand for `vector inner`
    pub fn vector(inner: TypeExpr) -> Self {
        TypeExpr::Vector(Box::new(inner))
    }

    /// Shorthand for `dictionary inner`
    pub fn dictionary(inner: TypeExpr) -> Self {
        TypeExpr::Dictionary(Box::new(inner))
    }

    /// Dispatch to the visitor method matching this variant.
    pub fn accept<V: TypeExprVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            TypeExpr::Builtin(b) => visitor.visit_builtin(*b),
            TypeExpr::Named(name) => visitor.visit_named(name),
            TypeExpr::Maybe(inner) => visitor.visit_maybe(inner),
            TypeExpr::Vector(inner) => visitor.visit_vector(inner),
            TypeExpr::Dictionary(inner) => visitor.visit_dictionary(inner),
        }
    }

    /// Names of every schema type referenced anywhere in this expression
    pub fn referenced_types(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeExpr::Builtin(_) => {}
            TypeExpr::Named(name) => out.push(name),
            TypeExpr::Maybe(inner) | TypeExpr::Vector(inner) | TypeExpr::Dictionary(inner) => {
                inner.collect_names(out)
            }
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Builtin(b) => write!(f, "{}", b.tl_name()),
            TypeExpr::Named(name) => write!(f, "{name}"),
            TypeExpr::Maybe(inner) => write!(f, "(Maybe {inner})"),
            TypeExpr::Vector(inner) => write!(f, "(vector {inner})"),
            TypeExpr::Dictionary(inner) => write!(f, "(dictionary {inner})"),
        }
    }
}

/// Visitor over the closed set of [`TypeExpr`] variants.
///
/// Implementations recurse by calling [`TypeExpr::accept`] on the inner
/// expression of wrapper variants. Named references are leaves: the
/// referenced type is generated on its own and only referred to by name.
pub trait TypeExprVisitor {
    type Output;

    fn visit_builtin(&mut self, builtin: Builtin) -> Self::Output;
    fn visit_named(&mut self, name: &str) -> Self::Output;
    fn visit_maybe(&mut self, inner: &TypeExpr) -> Self::Output;
    fn visit_vector(&mut self, inner: &TypeExpr) -> Self::Output;
    fn visit_dictionary(&mut self, inner: &TypeExpr) -> Self::Output;
}

/// A field of a combinator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Field {
    /// Field name; empty for anonymous arguments until normalization.
    #[serde(default)]
    pub name: String,

    /// Field type.
    #[serde(rename = "type")]
    pub ty: TypeExpr,

    /// Field-mask bit guarding this field; `None` for required fields.
    #[serde(default)]
    pub mask_bit: Option<u8>,
}

impl Field {
    /// Create a required field
    pub fn required(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            mask_bit: None,
        }
    }

    /// Create a field present only when `bit` is set in the field-mask
    pub fn optional(name: impl Into<String>, ty: TypeExpr, bit: u8) -> Self {
        Self {
            name: name.into(),
            ty,
            mask_bit: Some(bit),
        }
    }

    pub fn is_optional(&self) -> bool {
        self.mask_bit.is_some()
    }
}

/// Which role a combinator plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CombinatorKind {
    Constructor,
    Function,
}

/// Shared view over functions and constructors.
pub trait Combinator {
    fn name(&self) -> &str;
    fn magic(&self) -> Magic;
    fn fields(&self) -> &[Field];
    fn kind(&self) -> CombinatorKind;

    /// Optional fields in declaration order
    fn optional_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields().iter().filter(|f| f.is_optional())
    }

    fn has_optional_fields(&self) -> bool {
        self.fields().iter().any(Field::is_optional)
    }

    /// Bitwise OR of every optional field's bit
    fn fields_mask_all(&self) -> u32 {
        self.fields()
            .iter()
            .filter_map(|f| f.mask_bit)
            .fold(0u32, |mask, bit| mask | 1u32.checked_shl(u32::from(bit)).unwrap_or(0))
    }
}

/// One variant of a sum type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Constructor {
    pub name: String,

    #[serde(deserialize_with = "deserialize_magic")]
    pub magic: Magic,

    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Constructor {
    pub fn new(name: impl Into<String>, magic: Magic, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            magic,
            fields,
        }
    }
}

impl Combinator for Constructor {
    fn name(&self) -> &str {
        &self.name
    }

    fn magic(&self) -> Magic {
        self.magic
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn kind(&self) -> CombinatorKind {
        CombinatorKind::Constructor
    }
}

/// A named sum type owning its constructors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Type {
    pub name: String,

    #[serde(default)]
    pub constructors: Vec<Constructor>,
}

impl Type {
    pub fn new(name: impl Into<String>, constructors: Vec<Constructor>) -> Self {
        Self {
            name: name.into(),
            constructors,
        }
    }

    /// Constructor whose magic equals `magic`
    pub fn constructor_by_magic(&self, magic: Magic) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.magic == magic)
    }
}

/// RPC entry point.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Function {
    pub name: String,

    #[serde(deserialize_with = "deserialize_magic")]
    pub magic: Magic,

    #[serde(default)]
    pub fields: Vec<Field>,

    /// Type of the value answered to this request.
    pub result: TypeExpr,

    /// Internal-only function; skipped unless internals are generated.
    #[serde(default)]
    pub internal: bool,

    /// Eligible for server-side inbound dispatch.
    #[serde(default)]
    pub rpc_server: bool,
}

impl Function {
    pub fn new(name: impl Into<String>, magic: Magic, fields: Vec<Field>, result: TypeExpr) -> Self {
        Self {
            name: name.into(),
            magic,
            fields,
            result,
            internal: false,
            rpc_server: false,
        }
    }

    /// Mark as server-dispatchable
    pub fn with_rpc_server(mut self) -> Self {
        self.rpc_server = true;
        self
    }

    /// Mark as internal-only
    pub fn with_internal(mut self) -> Self {
        self.internal = true;
        self
    }
}

impl Combinator for Function {
    fn name(&self) -> &str {
        &self.name
    }

    fn magic(&self) -> Magic {
        self.magic
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn kind(&self) -> CombinatorKind {
        CombinatorKind::Function
    }
}

/// The complete schema graph.
///
/// Both maps are ordered by name so every traversal is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub types: BTreeMap<String, Type>,
    pub functions: BTreeMap<String, Function>,
}

impl Schema {
    /// Build a schema, rejecting duplicate type or function names.
    pub fn from_parts(
        types: impl IntoIterator<Item = Type>,
        functions: impl IntoIterator<Item = Function>,
    ) -> Result<Self, SchemaError> {
        let mut schema = Schema::default();
        for t in types {
            if schema.types.contains_key(&t.name) {
                return Err(SchemaError::new(
                    SchemaErrorKind::Parse,
                    format!("duplicate type `{}`", t.name),
                ));
            }
            schema.types.insert(t.name.clone(), t);
        }
        for f in functions {
            if schema.functions.contains_key(&f.name) {
                return Err(SchemaError::new(
                    SchemaErrorKind::Parse,
                    format!("duplicate function `{}`", f.name),
                ));
            }
            schema.functions.insert(f.name.clone(), f);
        }
        Ok(schema)
    }

    pub fn find_type(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn function_by_magic(&self, magic: Magic) -> Option<&Function> {
        self.functions.values().find(|f| f.magic == magic)
    }

    pub fn constructor_by_magic(&self, magic: Magic) -> Option<&Constructor> {
        self.types.values().find_map(|t| t.constructor_by_magic(magic))
    }

    /// The type owning the constructor named `constructor`
    pub fn constructor_owner(&self, constructor: &str) -> Option<&Type> {
        self.types
            .values()
            .find(|t| t.constructors.iter().any(|c| c.name == constructor))
    }

    pub fn constructors(&self) -> impl Iterator<Item = &Constructor> {
        self.types.values().flat_map(|t| t.constructors.iter())
    }
}

// ----------------------------------------------------------------------------
// Deserialization helpers
// ----------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypeExpr {
    Name(String),
    Wrapped(WrappedTypeExpr),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum WrappedTypeExpr {
    Maybe(Box<TypeExpr>),
    Vector(Box<TypeExpr>),
    Dictionary(Box<TypeExpr>),
}

impl From<RawTypeExpr> for TypeExpr {
    fn from(raw: RawTypeExpr) -> Self {
        match raw {
            RawTypeExpr::Name(name) => match Builtin::from_name(&name) {
                Some(b) => TypeExpr::Builtin(b),
                None => TypeExpr::Named(name),
            },
            RawTypeExpr::Wrapped(WrappedTypeExpr::Maybe(inner)) => TypeExpr::Maybe(inner),
            RawTypeExpr::Wrapped(WrappedTypeExpr::Vector(inner)) => TypeExpr::Vector(inner),
            RawTypeExpr::Wrapped(WrappedTypeExpr::Dictionary(inner)) => {
                TypeExpr::Dictionary(inner)
            }
        }
    }
}

impl<'de> Deserialize<'de> for TypeExpr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawTypeExpr::deserialize(deserializer).map(Into::into)
    }
}

/// Accept magics as JSON numbers or `"0x..."` strings.
fn deserialize_magic<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Magic, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMagic {
        Number(u32),
        Text(String),
    }

    match RawMagic::deserialize(deserializer)? {
        RawMagic::Number(n) => Ok(n),
        RawMagic::Text(s) => {
            let digits = s
                .strip_prefix("0x")
                .or_else(|| s.strip_prefix("0X"))
                .ok_or_else(|| serde::de::Error::custom(format!("magic `{s}` must be 0x-prefixed")))?;
            u32::from_str_radix(digits, 16)
                .map_err(|e| serde::de::Error::custom(format!("invalid magic `{s}`: {e}")))
        }
    }
}

#[cfg(test)]
#[path = "schema/schema_tests.rs"]
mod schema_tests;
