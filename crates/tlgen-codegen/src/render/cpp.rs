//! C++ backend

use super::{CodeWriter, Renderer};
use crate::constants::{ModuleConstants, compile_raw_data};
use crate::dispatch::UNKNOWN_MAGIC_NAME;
use crate::generate::ModuleIr;
use crate::ir::{
    Codec, CodecFn, CodecKind, CodecOp, ConstStrings, Decl, MagicCase, MagicTable, ServerDispatch,
    Stmt, StorerTable, StructDecl, VariantDecl,
};
use crate::naming::{self, EntityPrefix};
use std::collections::BTreeSet;
use tlgen_core::{Builtin, Magic, TypeExpr};

/// Renders IR as C++ against the runtime declared in `runtime_headers`.
#[derive(Debug, Clone)]
pub struct CppRenderer {
    runtime_headers: String,
}

impl CppRenderer {
    pub fn new(runtime_headers: impl Into<String>) -> Self {
        Self {
            runtime_headers: runtime_headers.into(),
        }
    }
}

fn magic_literal(magic: Magic) -> String {
    format!("{magic:#010x}U")
}

fn bit_literal(bit: u8) -> String {
    format!("1U << {bit}U")
}

fn prefix_of(kind: CodecKind) -> EntityPrefix {
    match kind {
        CodecKind::Type => EntityPrefix::Type,
        CodecKind::Constructor => EntityPrefix::Constructor,
        CodecKind::Function | CodecKind::FunctionResult => EntityPrefix::Function,
    }
}

fn builtin_type(b: Builtin) -> &'static str {
    match b {
        Builtin::Int => "int32_t",
        Builtin::Long => "int64_t",
        Builtin::Double => "double",
        Builtin::String => "string",
        Builtin::Nat => "uint32_t",
        Builtin::True => "bool",
    }
}

/// Native C++ type of a field
fn value_type(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Builtin(b) => builtin_type(*b).to_string(),
        TypeExpr::Named(name) => naming::struct_name(EntityPrefix::Type, name),
        TypeExpr::Maybe(inner) => format!("std::optional<{}>", value_type(inner)),
        TypeExpr::Vector(inner) => format!("std::vector<{}>", value_type(inner)),
        TypeExpr::Dictionary(inner) => {
            format!("std::vector<std::pair<string, {}>>", value_type(inner))
        }
    }
}

/// Codec tag whose static `store`/`fetch` encode a value
fn codec_type(codec: &Codec) -> String {
    match codec {
        Codec::Builtin(b) => format!("tl_{}", builtin_codec_suffix(*b)),
        Codec::Type(name) => naming::struct_name(EntityPrefix::Type, name),
        Codec::Maybe(inner) => format!("tl_maybe<{}>", codec_type(inner)),
        Codec::Vector(inner) => format!("tl_vector<{}>", codec_type(inner)),
        Codec::Dictionary(inner) => format!("tl_dictionary<{}>", codec_type(inner)),
    }
}

fn builtin_codec_suffix(b: Builtin) -> &'static str {
    match b {
        Builtin::Int => "int",
        Builtin::Long => "long",
        Builtin::Double => "double",
        Builtin::String => "string",
        Builtin::Nat => "nat",
        Builtin::True => "true",
    }
}

fn is_true(codec: &Codec) -> bool {
    matches!(codec, Codec::Builtin(Builtin::True))
}

impl CppRenderer {
    fn prologue(&self, w: &mut CodeWriter, pragma_once: bool) {
        if pragma_once {
            w.line("#pragma once");
            w.blank();
        }
        w.include(&self.runtime_headers);
    }

    fn struct_decl(&self, w: &mut CodeWriter, s: &StructDecl) {
        let name = naming::struct_name(prefix_of(s.kind), &s.entity);
        w.open(format!("struct {name}"));
        w.line(format!(
            "static constexpr uint32_t MAGIC = {};",
            magic_literal(s.magic)
        ));
        for field in &s.fields {
            let ty = value_type(&field.ty);
            match field.mask_bit {
                None => w.line(format!("{ty} {};", field.name)),
                Some(_) if field.ty == TypeExpr::Builtin(Builtin::True) => {
                    w.line(format!("bool {}{{false}};", field.name))
                }
                Some(_) => w.line(format!("std::optional<{ty}> {};", field.name)),
            };
        }
        w.blank();
        if s.has_optional_fields() {
            w.line("uint32_t fields_mask() const;");
        }
        w.line("void store() const;");
        w.line(format!("static {name} fetch_body();"));
        if let Some(result) = &s.result {
            w.blank();
            w.line(format!("using result_type = {};", value_type(result)));
            w.line("static void store_result(const result_type &result);");
            w.line("static result_type fetch_result();");
        }
        w.close_with(";");
    }

    fn variant_decl(&self, w: &mut CodeWriter, v: &VariantDecl) {
        let name = naming::struct_name(EntityPrefix::Type, &v.entity);
        let alternatives: Vec<String> = v
            .cases
            .iter()
            .map(|c| naming::struct_name(EntityPrefix::Constructor, &c.constructor))
            .collect();
        w.open(format!("struct {name}"));
        w.line(format!("std::variant<{}> value;", alternatives.join(", ")));
        w.blank();
        w.line(format!("static void store(const {name} &v);"));
        w.line(format!("static {name} fetch();"));
        w.close_with(";");
    }

    fn fields_mask_fn(&self, w: &mut CodeWriter, name: &str, body: &[Stmt]) {
        w.open(format!("inline uint32_t {name}::fields_mask() const"));
        w.line("uint32_t mask = 0;");
        for stmt in body {
            if let Stmt::Field {
                name: field,
                codec,
                mask_bit: Some(bit),
            } = stmt
            {
                let present = if is_true(codec) {
                    field.clone()
                } else {
                    format!("{field}.has_value()")
                };
                w.line(format!("if ({present}) mask |= {};", bit_literal(*bit)));
            }
        }
        w.line("return mask;");
        w.close();
    }

    fn codec_fn(&self, w: &mut CodeWriter, f: &CodecFn) {
        let name = naming::struct_name(prefix_of(f.kind), &f.entity);
        match (f.kind, f.op) {
            (CodecKind::Type, CodecOp::Store) => {
                w.open(format!("inline void {name}::store(const {name} &v)"));
            }
            (CodecKind::Type, CodecOp::Fetch) => {
                w.open(format!("inline {name} {name}::fetch()"));
            }
            (CodecKind::FunctionResult, CodecOp::Store) => {
                w.open(format!(
                    "inline void {name}::store_result(const result_type &result)"
                ));
            }
            (CodecKind::FunctionResult, CodecOp::Fetch) => {
                w.open(format!("inline {name}::result_type {name}::fetch_result()"));
            }
            (_, CodecOp::Store) => {
                if f.body.contains(&Stmt::WriteFieldsMask) {
                    self.fields_mask_fn(w, &name, &f.body);
                    w.blank();
                }
                w.open(format!("inline void {name}::store() const"));
            }
            (_, CodecOp::Fetch) => {
                w.open(format!("inline {name} {name}::fetch_body()"));
                w.line(format!("{name} result;"));
            }
        }

        for stmt in &f.body {
            self.stmt(w, f, stmt);
        }

        if matches!(f.kind, CodecKind::Constructor | CodecKind::Function) && f.op == CodecOp::Fetch
        {
            w.line("return result;");
        }
        w.close();
    }

    fn stmt(&self, w: &mut CodeWriter, f: &CodecFn, stmt: &Stmt) {
        match stmt {
            Stmt::WriteMagic(magic) => {
                w.line(format!("rpc_store_int({});", magic_literal(*magic)));
            }
            Stmt::WriteFieldsMask => {
                w.line("const uint32_t fields_mask = this->fields_mask();");
                w.line("rpc_store_int(fields_mask);");
            }
            Stmt::ReadFieldsMask => {
                w.line("const auto fields_mask = static_cast<uint32_t>(rpc_fetch_int());");
            }
            Stmt::Field {
                name,
                codec,
                mask_bit,
            } => {
                let tag = codec_type(codec);
                let action = match (f.op, mask_bit) {
                    (CodecOp::Store, Some(_)) if !is_true(codec) => {
                        format!("{tag}::store(*{name});")
                    }
                    (CodecOp::Store, _) => format!("{tag}::store({name});"),
                    (CodecOp::Fetch, _) => format!("result.{name} = {tag}::fetch();"),
                };
                match mask_bit {
                    Some(bit) => {
                        w.open(format!("if (fields_mask & ({}))", bit_literal(*bit)));
                        w.line(action);
                        w.close();
                    }
                    None => {
                        w.line(action);
                    }
                }
            }
            Stmt::ForwardToVariant { .. } => {
                w.line("std::visit([](const auto &c) { c.store(); }, v.value);");
            }
            Stmt::SwitchMagic { cases } => self.switch_magic(w, &f.entity, cases),
            Stmt::Result(codec) => {
                let tag = codec_type(codec);
                match f.op {
                    CodecOp::Store => w.line(format!("{tag}::store(result);")),
                    CodecOp::Fetch => w.line(format!("return {tag}::fetch();")),
                };
            }
        }
    }

    fn switch_magic(&self, w: &mut CodeWriter, type_name: &str, cases: &[MagicCase]) {
        w.line("const auto magic = static_cast<uint32_t>(rpc_fetch_int());");
        w.open("switch (magic)");
        for case in cases {
            w.line(format!("case {}:", magic_literal(case.magic)));
            w.line(format!(
                "  return {{{}::fetch_body()}};",
                naming::struct_name(EntityPrefix::Constructor, &case.constructor)
            ));
        }
        w.line("default:");
        w.line(format!(
            "  tl_fetch_error(\"unknown constructor magic 0x%08x of type {type_name}\", magic);"
        ));
        w.line("  return {};");
        w.close();
    }
}

impl Renderer for CppRenderer {
    fn render_module(&self, module: &ModuleIr) -> String {
        let mut w = CodeWriter::new();
        self.prologue(&mut w, true);
        for include in &module.includes {
            w.include(&include.path());
        }

        for decl in &module.decls {
            w.blank();
            match decl {
                Decl::Struct(s) => self.struct_decl(&mut w, s),
                Decl::Variant(v) => self.variant_decl(&mut w, v),
            }
        }

        for f in module.codecs.iter() {
            w.blank();
            self.codec_fn(&mut w, f);
        }
        w.finish()
    }

    fn render_server_dispatch(&self, dispatch: &ServerDispatch) -> String {
        let mut w = CodeWriter::new();
        self.prologue(&mut w, false);
        for include in &dispatch.includes {
            w.include(&include.path());
        }
        w.blank();

        w.open("rpc_request_ptr rpc_server_fetch_request()");
        w.line("auto function_magic = static_cast<unsigned int>(rpc_fetch_int());");
        w.open("switch (function_magic)");
        for case in &dispatch.cases {
            let f = naming::struct_name(EntityPrefix::Function, &case.function);
            w.open(format!("case {}:", magic_literal(case.magic)));
            w.line(format!("auto request = make_rpc_request<{}>();", case.handler));
            w.line(format!("request->query = {f}::fetch_body();"));
            w.line("CurrentRpcServerQuery::get().save(request);");
            w.line("return request;");
            w.close();
        }
        w.open("default:");
        w.line(
            "php_warning(\"Unexpected function magic on fetching request in rpc server: 0x%08x\", function_magic);",
        );
        w.line("return {};");
        w.close();
        w.close();
        w.close();
        w.finish()
    }

    fn render_runtime_bindings(
        &self,
        modules_with_functions: &BTreeSet<String>,
        storers: &StorerTable,
    ) -> String {
        let mut w = CodeWriter::new();
        self.prologue(&mut w, false);
        w.include("tl/tl_const_vars.h");
        for module in modules_with_functions {
            w.include(&format!("tl/{module}.h"));
        }
        w.blank();

        w.open("tl_untyped_result gen$tl_fetch_wrapper(std::unique_ptr<tl_func_base> stored_fetcher)");
        w.line("return stored_fetcher->fetch_untyped();");
        w.close();
        w.blank();

        w.line("tl_storers_table gen$tl_storers_ht;");
        w.open("void fill_tl_storers_ht()");
        for entry in &storers.entries {
            w.line(format!(
                "gen$tl_storers_ht.set_value({}, &tl_store_untyped<{}>, {}L);",
                entry.name_ident,
                naming::struct_name(EntityPrefix::Function, &entry.function),
                entry.hash
            ));
        }
        w.close();
        w.finish()
    }

    fn render_const_vars_header(&self, strings: &ConstStrings) -> String {
        let mut w = CodeWriter::new();
        self.prologue(&mut w, true);
        w.blank();
        for s in strings.iter() {
            w.line(format!("extern string {};", naming::const_str_ident(s)));
        }
        w.finish()
    }

    fn render_const_vars_source(&self, strings: &ConstStrings, magic_table: &MagicTable) -> String {
        let mut w = CodeWriter::new();
        self.prologue(&mut w, false);
        w.include("tl/tl_const_vars.h");
        w.blank();

        for s in strings.iter() {
            w.line(format!("string {};", naming::const_str_ident(s)));
        }
        w.blank();

        let raw = compile_raw_data(strings);
        w.open(format!(
            "alignas(8) static const std::array<char, {}> raw =",
            raw.bytes.len()
        ));
        for chunk in raw.bytes.chunks(16) {
            let bytes: Vec<String> = chunk.iter().map(|b| format!("{b:#04x}")).collect();
            w.line(format!("{},", bytes.join(", ")));
        }
        w.close_with(";");
        w.blank();

        w.open("void tl_str_const_init()");
        for (s, shift) in strings.iter().zip(&raw.shifts) {
            w.line(format!(
                "{}.assign_raw(&raw[{shift}]);",
                naming::const_str_ident(s)
            ));
        }
        w.close();
        w.blank();

        let n = magic_table.len();
        w.open(format!(
            "static constexpr std::array<unsigned int, {n}> tl_magic_ids ="
        ));
        for magic in &magic_table.ids {
            w.line(format!("{},", magic_literal(*magic)));
        }
        w.close_with(";");
        w.open(format!(
            "static constexpr std::array<const char *, {n}> tl_magic_names ="
        ));
        for name in &magic_table.names {
            w.line(format!("\"{name}\","));
        }
        w.close_with(";");
        w.blank();

        w.open("void tl_magic_fill_all_functions_impl(array<string> &out) noexcept");
        w.line(format!("out.reserve({n}, false);"));
        w.open("for (size_t i = 0; i < tl_magic_ids.size(); ++i)");
        w.line("out.set_value(static_cast<int64_t>(tl_magic_ids[i]), string(tl_magic_names[i]));");
        w.close();
        w.close();
        w.blank();

        w.open("const char *tl_magic_convert_to_name_impl(unsigned int magic) noexcept");
        w.open("for (size_t i = 0; i < tl_magic_ids.size(); ++i)");
        w.line("if (tl_magic_ids[i] == magic) return tl_magic_names[i];");
        w.close();
        w.line(format!("return \"{UNKNOWN_MAGIC_NAME}\";"));
        w.close();
        w.finish()
    }

    fn render_constants(&self, constants: &[ModuleConstants]) -> String {
        let mut w = CodeWriter::new();
        w.line("#pragma once");
        w.blank();
        w.line("#include <cstdint>");
        w.blank();

        for c in constants.iter().flat_map(|m| &m.magics) {
            w.line(format!("#define {} {}", c.name, magic_literal(c.magic)));
        }
        w.blank();

        w.line("namespace tl {");
        for module in constants.iter().filter(|m| !m.masks.is_empty()) {
            w.line(format!("namespace {} {{", module.module));
            for mask in &module.masks {
                w.blank();
                w.line(format!("namespace {} {{", mask.namespace));
                for (field, bit) in &mask.bits {
                    w.line(format!(
                        "constexpr static uint32_t {field} = {};",
                        bit_literal(*bit)
                    ));
                }
                w.line(format!(
                    "constexpr static uint32_t ALL = {:#010x};",
                    mask.all
                ));
                w.line(format!("}} // namespace {}", mask.namespace));
            }
            w.blank();
            w.line(format!("}} // namespace {}", module.module));
        }
        w.line("} // namespace tl");
        w.finish()
    }
}
