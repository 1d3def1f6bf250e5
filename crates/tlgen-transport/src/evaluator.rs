//! Executes generated store/fetch IR against the wire format.
//!
//! An [`Evaluator`] holds the codec functions of one generation pass and runs
//! their statements exactly as a compiled backend would: stores write the
//! magic, the field-mask and the present fields in declared order; fetches
//! read the mask and skip every optional field whose bit is clear.
//!
//! The evaluator is immutable once built. Every call works on a caller-owned
//! [`WireWriter`] or [`WireReader`], so one evaluator can serve any number of
//! threads.

use crate::value::{Record, Value};
use crate::wire::{CodecError, MAYBE_ABSENT, MAYBE_PRESENT, WireReader, WireWriter};
use std::collections::{BTreeMap, HashMap};
use tlgen_codegen::Generated;
use tlgen_codegen::ir::{Codec, CodecFn, CodecKey, CodecKind, CodecOp, Stmt};
use tlgen_core::{Builtin, Magic};

/// Runtime over one pass's codec functions
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    codecs: HashMap<CodecKey, CodecFn>,
    magics: HashMap<(CodecKind, String), Magic>,
}

impl Evaluator {
    pub fn new(codecs: impl IntoIterator<Item = CodecFn>) -> Self {
        let mut evaluator = Self::default();
        for codec in codecs {
            if let Some(magic) = codec.written_magic() {
                evaluator
                    .magics
                    .insert((codec.kind, codec.entity.clone()), magic);
            }
            evaluator.codecs.entry(codec.key()).or_insert(codec);
        }
        evaluator
    }

    pub fn from_generated(generated: &Generated) -> Self {
        Self::new(generated.codecs().cloned())
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Magic of a constructor or function
    pub fn magic_of(&self, kind: CodecKind, entity: &str) -> Option<Magic> {
        self.magics.get(&(kind, entity.to_string())).copied()
    }

    fn codec(&self, kind: CodecKind, entity: &str, op: CodecOp) -> Result<&CodecFn, CodecError> {
        self.codecs
            .get(&CodecKey::new(kind, entity, op))
            .ok_or_else(|| CodecError::MissingCodec(format!("{kind:?} `{entity}` ({op:?})")))
    }

    // ------------------------------------------------------------------------
    // Store
    // ------------------------------------------------------------------------

    /// Store a boxed value of a sum type: the held constructor's magic and body.
    pub fn store_type(
        &self,
        w: &mut WireWriter,
        type_name: &str,
        value: &Value,
    ) -> Result<(), CodecError> {
        let codec = self.codec(CodecKind::Type, type_name, CodecOp::Store)?;
        let record = value.as_record().ok_or_else(|| mismatch(type_name, value))?;
        for stmt in &codec.body {
            match stmt {
                Stmt::ForwardToVariant { cases } => {
                    if !cases.iter().any(|c| c.constructor == record.constructor) {
                        return Err(CodecError::ValueMismatch {
                            expected: format!("a constructor of `{type_name}`"),
                            found: format!("`{}`", record.constructor),
                        });
                    }
                    self.store_combinator(w, CodecKind::Constructor, record)?;
                }
                _ => return Err(invalid_statement(codec)),
            }
        }
        Ok(())
    }

    /// Store a constructor or function: magic, field-mask, present fields.
    pub fn store_combinator(
        &self,
        w: &mut WireWriter,
        kind: CodecKind,
        record: &Record,
    ) -> Result<(), CodecError> {
        let codec = self.codec(kind, &record.constructor, CodecOp::Store)?;
        let mut mask = 0u32;
        for stmt in &codec.body {
            match stmt {
                Stmt::WriteMagic(magic) => w.write_u32(*magic),
                Stmt::WriteFieldsMask => {
                    mask = fields_mask(codec, record);
                    w.write_u32(mask);
                }
                Stmt::Field {
                    name,
                    codec: field_codec,
                    mask_bit,
                } => {
                    if mask_bit.is_some_and(|bit| mask & (1 << bit) == 0) {
                        continue;
                    }
                    let value = record.get(name).ok_or_else(|| CodecError::MissingField {
                        entity: record.constructor.clone(),
                        field: name.clone(),
                    })?;
                    self.store_codec(w, field_codec, value)?;
                }
                _ => return Err(invalid_statement(codec)),
            }
        }
        Ok(())
    }

    /// Store the answer of `function`
    pub fn store_result(
        &self,
        w: &mut WireWriter,
        function: &str,
        value: &Value,
    ) -> Result<(), CodecError> {
        let codec = self.codec(CodecKind::FunctionResult, function, CodecOp::Store)?;
        for stmt in &codec.body {
            match stmt {
                Stmt::Result(result) => self.store_codec(w, result, value)?,
                _ => return Err(invalid_statement(codec)),
            }
        }
        Ok(())
    }

    fn store_codec(&self, w: &mut WireWriter, codec: &Codec, value: &Value) -> Result<(), CodecError> {
        match (codec, value) {
            (Codec::Builtin(Builtin::Int), Value::Int(v)) => w.write_i32(*v),
            (Codec::Builtin(Builtin::Long), Value::Long(v)) => w.write_i64(*v),
            (Codec::Builtin(Builtin::Double), Value::Double(v)) => w.write_f64(*v),
            (Codec::Builtin(Builtin::String), Value::String(v)) => w.write_string(v)?,
            (Codec::Builtin(Builtin::Nat), Value::Nat(v)) => w.write_u32(*v),
            (Codec::Builtin(Builtin::True), Value::True) => {}
            (Codec::Type(name), value) => self.store_type(w, name, value)?,
            (Codec::Maybe(_), Value::Maybe(None)) => w.write_u32(MAYBE_ABSENT),
            (Codec::Maybe(inner), Value::Maybe(Some(v))) => {
                w.write_u32(MAYBE_PRESENT);
                self.store_codec(w, inner, v)?;
            }
            (Codec::Vector(inner), Value::Vector(items)) => {
                w.write_count(items.len())?;
                for item in items {
                    self.store_codec(w, inner, item)?;
                }
            }
            (Codec::Dictionary(inner), Value::Dictionary(entries)) => {
                w.write_count(entries.len())?;
                for (key, item) in entries {
                    w.write_string(key)?;
                    self.store_codec(w, inner, item)?;
                }
            }
            (codec, value) => return Err(mismatch(&codec_name(codec), value)),
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Fetch
    // ------------------------------------------------------------------------

    /// Fetch a boxed value of a sum type by switching on its magic.
    pub fn fetch_type(&self, r: &mut WireReader<'_>, type_name: &str) -> Result<Value, CodecError> {
        let codec = self.codec(CodecKind::Type, type_name, CodecOp::Fetch)?;
        match codec.body.as_slice() {
            [Stmt::SwitchMagic { cases }] => {
                let magic = r.read_u32()?;
                let case = cases.iter().find(|c| c.magic == magic).ok_or_else(|| {
                    CodecError::UnknownConstructor {
                        type_name: type_name.to_string(),
                        magic,
                    }
                })?;
                self.fetch_combinator_body(r, CodecKind::Constructor, &case.constructor)
                    .map(Value::Record)
            }
            _ => Err(invalid_statement(codec)),
        }
    }

    /// Fetch a combinator whose magic the caller has already consumed.
    pub fn fetch_combinator_body(
        &self,
        r: &mut WireReader<'_>,
        kind: CodecKind,
        name: &str,
    ) -> Result<Record, CodecError> {
        let codec = self.codec(kind, name, CodecOp::Fetch)?;
        let mut mask = 0u32;
        let mut fields = BTreeMap::new();
        for stmt in &codec.body {
            match stmt {
                Stmt::ReadFieldsMask => mask = r.read_u32()?,
                Stmt::Field {
                    name: field,
                    codec: field_codec,
                    mask_bit,
                } => {
                    if mask_bit.is_some_and(|bit| mask & (1 << bit) == 0) {
                        continue;
                    }
                    fields.insert(field.clone(), self.fetch_codec(r, field_codec)?);
                }
                _ => return Err(invalid_statement(codec)),
            }
        }
        Ok(Record {
            constructor: name.to_string(),
            fields,
        })
    }

    /// Read a magic, check it against the combinator's, then fetch the body.
    pub fn fetch_boxed(
        &self,
        r: &mut WireReader<'_>,
        kind: CodecKind,
        name: &str,
    ) -> Result<Record, CodecError> {
        let expected = self
            .magic_of(kind, name)
            .ok_or_else(|| CodecError::MissingCodec(format!("{kind:?} `{name}` (magic)")))?;
        let found = r.read_u32()?;
        if found != expected {
            return Err(CodecError::MagicMismatch { expected, found });
        }
        self.fetch_combinator_body(r, kind, name)
    }

    /// Fetch the answer of `function`
    pub fn fetch_result(&self, r: &mut WireReader<'_>, function: &str) -> Result<Value, CodecError> {
        let codec = self.codec(CodecKind::FunctionResult, function, CodecOp::Fetch)?;
        match codec.body.as_slice() {
            [Stmt::Result(result)] => self.fetch_codec(r, result),
            _ => Err(invalid_statement(codec)),
        }
    }

    fn fetch_codec(&self, r: &mut WireReader<'_>, codec: &Codec) -> Result<Value, CodecError> {
        Ok(match codec {
            Codec::Builtin(Builtin::Int) => Value::Int(r.read_i32()?),
            Codec::Builtin(Builtin::Long) => Value::Long(r.read_i64()?),
            Codec::Builtin(Builtin::Double) => Value::Double(r.read_f64()?),
            Codec::Builtin(Builtin::String) => Value::String(r.read_string()?),
            Codec::Builtin(Builtin::Nat) => Value::Nat(r.read_u32()?),
            Codec::Builtin(Builtin::True) => Value::True,
            Codec::Type(name) => self.fetch_type(r, name)?,
            Codec::Maybe(inner) => match r.read_u32()? {
                MAYBE_ABSENT => Value::Maybe(None),
                MAYBE_PRESENT => Value::some(self.fetch_codec(r, inner)?),
                other => return Err(CodecError::InvalidMaybeMagic(other)),
            },
            Codec::Vector(inner) => {
                let count = r.read_count_of(min_wire_size(inner))?;
                let mut items = Vec::with_capacity(count.min(r.remaining()));
                for _ in 0..count {
                    items.push(self.fetch_codec(r, inner)?);
                }
                Value::Vector(items)
            }
            Codec::Dictionary(inner) => {
                let count = r.read_count_of(4 + min_wire_size(inner))?;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let key = r.read_string()?;
                    entries.push((key, self.fetch_codec(r, inner)?));
                }
                Value::Dictionary(entries)
            }
        })
    }
}

/// Mask with one bit set per optional field present in `record`.
fn fields_mask(codec: &CodecFn, record: &Record) -> u32 {
    codec
        .body
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Field {
                name,
                mask_bit: Some(bit),
                ..
            } => record.get(name).map(|_| 1u32 << bit),
            _ => None,
        })
        .fold(0, |mask, bit| mask | bit)
}

/// Fewest bytes one value of `codec` can occupy on the wire.
fn min_wire_size(codec: &Codec) -> usize {
    match codec {
        Codec::Builtin(Builtin::True) => 0,
        Codec::Builtin(Builtin::Long | Builtin::Double) => 8,
        Codec::Builtin(_)
        | Codec::Type(_)
        | Codec::Maybe(_)
        | Codec::Vector(_)
        | Codec::Dictionary(_) => 4,
    }
}

fn codec_name(codec: &Codec) -> String {
    match codec {
        Codec::Builtin(b) => b.tl_name().to_string(),
        Codec::Type(name) => name.clone(),
        Codec::Maybe(inner) => format!("Maybe {}", codec_name(inner)),
        Codec::Vector(inner) => format!("vector {}", codec_name(inner)),
        Codec::Dictionary(inner) => format!("dictionary {}", codec_name(inner)),
    }
}

fn mismatch(expected: &str, value: &Value) -> CodecError {
    CodecError::ValueMismatch {
        expected: expected.to_string(),
        found: value.kind_name(),
    }
}

fn invalid_statement(codec: &CodecFn) -> CodecError {
    CodecError::InvalidStatement(format!(
        "{:?} `{}` ({:?})",
        codec.kind, codec.entity, codec.op
    ))
}
