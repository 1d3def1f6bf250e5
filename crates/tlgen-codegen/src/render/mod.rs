//! Rendering backends.
//!
//! A [`Renderer`] turns the structural IR into the text of one target
//! language. Backends never decide what is generated, only how it is spelled.

mod cpp;

pub use cpp::CppRenderer;

use crate::constants::ModuleConstants;
use crate::generate::ModuleIr;
use crate::ir::{ConstStrings, MagicTable, ServerDispatch, StorerTable};
use std::collections::BTreeSet;

/// Text emission for every kind of output unit
pub trait Renderer {
    /// Declarations and store/fetch definitions of one module
    fn render_module(&self, module: &ModuleIr) -> String;

    /// Inbound request switch
    fn render_server_dispatch(&self, dispatch: &ServerDispatch) -> String;

    /// Fetch wrapper and storer registry for untyped calls
    fn render_runtime_bindings(
        &self,
        modules_with_functions: &BTreeSet<String>,
        storers: &StorerTable,
    ) -> String;

    fn render_const_vars_header(&self, strings: &ConstStrings) -> String;

    /// Interned strings plus the magic/name lookup tables
    fn render_const_vars_source(&self, strings: &ConstStrings, magic_table: &MagicTable) -> String;

    /// Magic and field-mask constants of every module
    fn render_constants(&self, constants: &[ModuleConstants]) -> String;
}

/// Line-oriented text builder tracking brace indentation.
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
    indent: usize,
}

impl CodeWriter {
    const INDENT: &'static str = "  ";

    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current indentation
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str(Self::INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    /// Write `head {` and indent what follows
    pub fn open(&mut self, head: impl AsRef<str>) -> &mut Self {
        let head = head.as_ref();
        if head.is_empty() {
            self.line("{");
        } else {
            self.line(format!("{head} {{"));
        }
        self.indent += 1;
        self
    }

    /// Dedent and write `}`
    pub fn close(&mut self) -> &mut Self {
        self.close_with("")
    }

    /// Dedent and write `}` followed by `tail`
    pub fn close_with(&mut self, tail: &str) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self.line(format!("}}{tail}"))
    }

    pub fn include(&mut self, path: &str) -> &mut Self {
        self.line(format!("#include \"{path}\""))
    }

    pub fn finish(self) -> String {
        self.out
    }
}
