//! Normalization passes run between loading and generation
//!
//! Each pass either rewrites the schema in place or rejects it. The pipeline
//! stops at the first failure; no pass output is kept from a failed run.

use crate::error::{SchemaError, SchemaErrorKind};
use crate::schema::{Combinator, Field, Magic, Schema, TypeExpr};
use std::collections::{BTreeMap, BTreeSet};

/// A schema rewrite or validation step
pub trait NormalizationPass {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn run(&self, schema: &mut Schema) -> Result<(), SchemaError>;
}

/// Run `passes` in order, stopping at the first error.
pub fn normalize(
    schema: &mut Schema,
    passes: &[Box<dyn NormalizationPass>],
) -> Result<(), SchemaError> {
    for pass in passes {
        tracing::debug!(pass = pass.name(), "running normalization pass");
        pass.run(schema)?;
    }
    Ok(())
}

/// Passes applied by default: anonymous-argument elimination, then the final check
pub fn default_passes() -> Vec<Box<dyn NormalizationPass>> {
    vec![Box::new(ReplaceAnonymousArgs), Box::new(FinalCheck)]
}

/// Gives every unnamed field a positional name (`arg0`, `arg1`, ...).
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplaceAnonymousArgs;

impl ReplaceAnonymousArgs {
    fn rename(owner: &str, fields: &mut [Field]) -> Result<(), SchemaError> {
        let taken: BTreeSet<String> = fields
            .iter()
            .filter(|f| !f.name.is_empty())
            .map(|f| f.name.clone())
            .collect();
        for (i, field) in fields.iter_mut().enumerate() {
            if !field.name.is_empty() {
                continue;
            }
            let name = format!("arg{i}");
            if taken.contains(&name) {
                return Err(SchemaError::new(
                    SchemaErrorKind::AnonymousArgs,
                    format!("`{owner}`: generated name `{name}` clashes with a declared field"),
                ));
            }
            field.name = name;
        }
        Ok(())
    }
}

impl NormalizationPass for ReplaceAnonymousArgs {
    fn name(&self) -> &'static str {
        "replace-anonymous-args"
    }

    fn run(&self, schema: &mut Schema) -> Result<(), SchemaError> {
        for t in schema.types.values_mut() {
            for c in &mut t.constructors {
                Self::rename(&c.name, &mut c.fields)?;
            }
        }
        for f in schema.functions.values_mut() {
            Self::rename(&f.name, &mut f.fields)?;
        }
        Ok(())
    }
}

/// Final consistency check over the whole schema.
///
/// Rejects unresolved type references, empty types, duplicate magics
/// (including a function sharing a magic with a constructor), duplicate
/// constructor names, and invalid or shared field-mask bits.
#[derive(Debug, Default, Clone, Copy)]
pub struct FinalCheck;

impl FinalCheck {
    fn check_combinator(schema: &Schema, c: &impl Combinator) -> Result<(), SchemaError> {
        let mut names = BTreeSet::new();
        let mut bits: BTreeMap<u8, &str> = BTreeMap::new();
        for field in c.fields() {
            if field.name.is_empty() {
                return Err(SchemaError::final_check(format!(
                    "`{}` has an anonymous field",
                    c.name()
                )));
            }
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::final_check(format!(
                    "`{}` declares field `{}` twice",
                    c.name(),
                    field.name
                )));
            }
            if let Some(bit) = field.mask_bit {
                if bit >= 32 {
                    return Err(SchemaError::final_check(format!(
                        "`{}.{}` uses mask bit {bit}, outside the 32-bit field-mask",
                        c.name(),
                        field.name
                    )));
                }
                if let Some(other) = bits.insert(bit, &field.name) {
                    return Err(SchemaError::final_check(format!(
                        "`{}` fields `{other}` and `{}` share mask bit {bit}",
                        c.name(),
                        field.name
                    )));
                }
            }
            Self::check_refs(schema, c.name(), &field.ty)?;
        }
        Ok(())
    }

    fn check_refs(schema: &Schema, owner: &str, ty: &TypeExpr) -> Result<(), SchemaError> {
        for name in ty.referenced_types() {
            if schema.find_type(name).is_none() {
                return Err(SchemaError::final_check(format!(
                    "`{owner}` references unknown type `{name}`"
                )));
            }
        }
        Ok(())
    }
}

impl NormalizationPass for FinalCheck {
    fn name(&self) -> &'static str {
        "final-check"
    }

    fn run(&self, schema: &mut Schema) -> Result<(), SchemaError> {
        let schema: &Schema = schema;
        let mut constructor_magics: BTreeMap<Magic, &str> = BTreeMap::new();
        let mut constructor_names = BTreeSet::new();

        for t in schema.types.values() {
            if t.constructors.is_empty() {
                return Err(SchemaError::final_check(format!(
                    "type `{}` has no constructors",
                    t.name
                )));
            }
            for c in &t.constructors {
                if !constructor_names.insert(c.name.as_str()) {
                    return Err(SchemaError::final_check(format!(
                        "constructor `{}` is declared twice",
                        c.name
                    )));
                }
                if let Some(other) = constructor_magics.insert(c.magic, &c.name) {
                    return Err(SchemaError::final_check(format!(
                        "constructors `{other}` and `{}` share magic {:#010x}",
                        c.name, c.magic
                    )));
                }
                Self::check_combinator(schema, c)?;
            }
        }

        let mut function_magics: BTreeMap<Magic, &str> = BTreeMap::new();
        for f in schema.functions.values() {
            if let Some(other) = function_magics.insert(f.magic, &f.name) {
                return Err(SchemaError::final_check(format!(
                    "functions `{other}` and `{}` share magic {:#010x}",
                    f.name, f.magic
                )));
            }
            if let Some(ctor) = constructor_magics.get(&f.magic) {
                return Err(SchemaError::final_check(format!(
                    "function `{}` and constructor `{ctor}` share magic {:#010x}",
                    f.name, f.magic
                )));
            }
            Self::check_combinator(schema, f)?;
            Self::check_refs(schema, &f.name, &f.result)?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "normalize/normalize_tests.rs"]
mod normalize_tests;
