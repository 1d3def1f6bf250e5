//! Magic constants, field-mask constants, and the interned string blob

use crate::ir::ConstStrings;
use crate::module::Module;
use crate::naming;
use std::collections::{BTreeMap, BTreeSet};
use tlgen_core::{Combinator, Magic, SchemaError};

/// A `#define`d combinator magic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicConst {
    pub name: String,
    pub magic: Magic,
}

/// One combinator's field-mask bits and their union
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldsMaskConsts {
    pub namespace: String,
    pub bits: Vec<(String, u8)>,
    pub all: u32,
}

/// Constants contributed by one module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleConstants {
    pub module: String,
    pub magics: Vec<MagicConst>,
    pub masks: Vec<FieldsMaskConsts>,
}

impl ModuleConstants {
    pub fn is_empty(&self) -> bool {
        self.magics.is_empty() && self.masks.is_empty()
    }
}

pub fn fields_mask_consts(c: &impl Combinator) -> FieldsMaskConsts {
    FieldsMaskConsts {
        namespace: naming::fields_mask_namespace(c.name()),
        bits: c
            .optional_fields()
            .filter_map(|f| f.mask_bit.map(|bit| (f.name.clone(), bit)))
            .collect(),
        all: c.fields_mask_all(),
    }
}

fn push_combinator(out: &mut ModuleConstants, c: &impl Combinator) {
    out.magics.push(MagicConst {
        name: naming::magic_define_name(c.name()),
        magic: c.magic(),
    });
    out.masks.push(fields_mask_consts(c));
}

/// Functions first, then constructors, each in module order.
pub fn module_constants(module: &Module<'_>) -> ModuleConstants {
    let mut out = ModuleConstants {
        module: module.name.clone(),
        ..ModuleConstants::default()
    };
    for f in module.target_functions.values() {
        push_combinator(&mut out, *f);
    }
    for t in module.target_types.values() {
        for c in &t.constructors {
            push_combinator(&mut out, c);
        }
    }
    out
}

/// Reject constants that would be emitted under the same identifier.
///
/// Magic defines share one global scope; field-mask namespaces are scoped
/// to their module.
pub fn check_identifiers<'a>(
    modules: impl IntoIterator<Item = &'a ModuleConstants>,
) -> Result<(), SchemaError> {
    let mut defines: BTreeMap<&str, &str> = BTreeMap::new();
    for module in modules {
        for magic in &module.magics {
            if let Some(other) = defines.insert(&magic.name, &module.module) {
                return Err(SchemaError::final_check(format!(
                    "`{}` is generated twice (modules `{other}` and `{}`)",
                    magic.name, module.module
                )));
            }
        }
        let mut namespaces = BTreeSet::new();
        for mask in &module.masks {
            if !namespaces.insert(mask.namespace.as_str()) {
                return Err(SchemaError::final_check(format!(
                    "field-mask namespace `{}::{}` is generated twice",
                    module.module, mask.namespace
                )));
            }
        }
    }
    Ok(())
}

/// Interned strings laid out in one byte blob.
///
/// Each entry is a little-endian `u32` length, the bytes, and a NUL.
/// `shifts[i]` is the offset where the i-th string's entry starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawData {
    pub bytes: Vec<u8>,
    pub shifts: Vec<usize>,
}

impl RawData {
    /// String stored at `shift`, if the blob holds a well-formed entry there
    pub fn string_at(&self, shift: usize) -> Option<&str> {
        let len_bytes = self.bytes.get(shift..shift.checked_add(4)?)?;
        let len = u32::from_le_bytes(len_bytes.try_into().ok()?) as usize;
        let start = shift + 4;
        let bytes = self.bytes.get(start..start.checked_add(len)?)?;
        std::str::from_utf8(bytes).ok()
    }
}

pub fn compile_raw_data(strings: &ConstStrings) -> RawData {
    let mut raw = RawData::default();
    for s in strings.iter() {
        raw.shifts.push(raw.bytes.len());
        let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
        raw.bytes.extend_from_slice(&len.to_le_bytes());
        raw.bytes.extend_from_slice(s.as_bytes());
        raw.bytes.push(0);
    }
    raw
}
