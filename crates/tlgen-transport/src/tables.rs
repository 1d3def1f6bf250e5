//! Process-wide lookup tables
//!
//! Both tables are built from generated IR, installed once at startup and
//! read-only afterwards. Installation goes through a `OnceCell`, so readers
//! on any thread see either nothing or the complete table.

use crate::evaluator::Evaluator;
use crate::value::Record;
use crate::wire::{CodecError, WireWriter};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use tlgen_codegen::dispatch::{UNKNOWN_MAGIC_NAME, name_hash};
use tlgen_codegen::ir::{CodecKind, MagicTable, StorerTable};
use tlgen_core::Magic;

static MAGIC_NAMES: OnceCell<MagicNameTable> = OnceCell::new();
static STORERS: OnceCell<StorerRegistry> = OnceCell::new();

/// Parallel magic and name arrays of every function
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MagicNameTable {
    ids: Vec<Magic>,
    names: Vec<String>,
}

impl MagicNameTable {
    pub fn new(table: &MagicTable) -> Self {
        Self {
            ids: table.ids.clone(),
            names: table.names.clone(),
        }
    }

    /// Name of the function with `magic`, or `"__unknown__"`.
    pub fn convert_to_name(&self, magic: Magic) -> &str {
        self.ids
            .iter()
            .position(|&id| id == magic)
            .and_then(|i| self.names.get(i))
            .map_or(UNKNOWN_MAGIC_NAME, String::as_str)
    }

    /// Every function as a magic to name map
    pub fn fill_all_functions(&self) -> HashMap<Magic, String> {
        self.ids
            .iter()
            .copied()
            .zip(self.names.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Install as the process-wide table. Fails with the table if one is already installed.
    pub fn install(self) -> Result<&'static Self, Self> {
        MAGIC_NAMES.try_insert(self).map_err(|(_, rejected)| rejected)
    }

    pub fn global() -> Option<&'static Self> {
        MAGIC_NAMES.get()
    }
}

/// Storer of one function, found by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storer {
    pub function: String,
    pub name_ident: String,
    pub hash: i64,
}

/// Name-keyed storers of every generated function.
///
/// Buckets are keyed by the precomputed name hash; names inside a bucket are
/// compared to resolve collisions.
#[derive(Debug, Clone, Default)]
pub struct StorerRegistry {
    buckets: HashMap<i64, Vec<Storer>>,
    len: usize,
}

impl StorerRegistry {
    /// Build from a storer table, checking every precomputed hash.
    pub fn new(table: &StorerTable) -> Result<Self, CodecError> {
        let mut registry = Self::default();
        for entry in &table.entries {
            let actual = name_hash(&entry.function);
            if actual != entry.hash {
                return Err(CodecError::ValueMismatch {
                    expected: format!("name hash {actual} for `{}`", entry.function),
                    found: entry.hash.to_string(),
                });
            }
            registry.buckets.entry(entry.hash).or_default().push(Storer {
                function: entry.function.clone(),
                name_ident: entry.name_ident.clone(),
                hash: entry.hash,
            });
            registry.len += 1;
        }
        Ok(registry)
    }

    pub fn get(&self, function: &str) -> Option<&Storer> {
        self.buckets
            .get(&name_hash(function))?
            .iter()
            .find(|s| s.function == function)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store an outbound call chosen by name at runtime.
    pub fn store_untyped(
        &self,
        evaluator: &Evaluator,
        w: &mut WireWriter,
        call: &Record,
    ) -> Result<(), CodecError> {
        let storer = self
            .get(&call.constructor)
            .ok_or_else(|| CodecError::UnknownFunction(call.constructor.clone()))?;
        tracing::trace!(function = %storer.function, hash = storer.hash, "untyped store");
        evaluator.store_combinator(w, CodecKind::Function, call)
    }

    /// Install as the process-wide registry. Fails with the registry if one is already installed.
    pub fn install(self) -> Result<&'static Self, Self> {
        STORERS.try_insert(self).map_err(|(_, rejected)| rejected)
    }

    pub fn global() -> Option<&'static Self> {
        STORERS.get()
    }
}
