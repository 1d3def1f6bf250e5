//! Output units and writing them to disk

use crate::generate::Generated;
use crate::render::Renderer;
use std::fs;
use std::path::{Path, PathBuf};
use tlgen_core::{GenError, GenResult};

pub const SERVER_DISPATCH_UNIT: &str = "tl/rpc_server_fetch_request.cpp";
pub const RUNTIME_BINDINGS_UNIT: &str = "tl/tl_runtime_bindings.cpp";
pub const CONST_VARS_HEADER_UNIT: &str = "tl/tl_const_vars.h";
pub const CONST_VARS_SOURCE_UNIT: &str = "tl/tl_const_vars.cpp";
pub const CONSTANTS_UNIT: &str = "tl/tl_constants.h";

/// One generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    /// Path relative to the output directory
    pub path: PathBuf,
    /// Dependencies, as written in include directives
    pub includes: Vec<String>,
    pub contents: String,
}

impl OutputUnit {
    fn new(path: impl Into<PathBuf>, includes: Vec<String>, contents: String) -> Self {
        Self {
            path: path.into(),
            includes,
            contents,
        }
    }
}

/// Render every unit of a pass: modules first, then the global units.
pub fn render_units(generated: &Generated, renderer: &dyn Renderer) -> Vec<OutputUnit> {
    let mut units: Vec<OutputUnit> = generated
        .modules
        .iter()
        .map(|m| {
            OutputUnit::new(
                format!("tl/{}.h", m.name),
                m.includes.iter().map(|i| i.path()).collect(),
                renderer.render_module(m),
            )
        })
        .collect();

    if let Some(storers) = &generated.storers {
        units.push(OutputUnit::new(
            RUNTIME_BINDINGS_UNIT,
            std::iter::once(CONST_VARS_HEADER_UNIT.to_string())
                .chain(
                    generated
                        .modules_with_functions
                        .iter()
                        .map(|m| format!("tl/{m}.h")),
                )
                .collect(),
            renderer.render_runtime_bindings(&generated.modules_with_functions, storers),
        ));
    }

    units.push(OutputUnit::new(
        SERVER_DISPATCH_UNIT,
        generated
            .server_dispatch
            .includes
            .iter()
            .map(|i| i.path())
            .collect(),
        renderer.render_server_dispatch(&generated.server_dispatch),
    ));
    units.push(OutputUnit::new(
        CONST_VARS_HEADER_UNIT,
        Vec::new(),
        renderer.render_const_vars_header(&generated.const_strings),
    ));
    units.push(OutputUnit::new(
        CONST_VARS_SOURCE_UNIT,
        vec![CONST_VARS_HEADER_UNIT.to_string()],
        renderer.render_const_vars_source(&generated.const_strings, &generated.magic_table),
    ));

    let constants: Vec<_> = generated
        .modules
        .iter()
        .map(|m| m.constants.clone())
        .collect();
    units.push(OutputUnit::new(
        CONSTANTS_UNIT,
        Vec::new(),
        renderer.render_constants(&constants),
    ));
    units
}

/// Files touched by [`write_units`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    /// Already present with identical contents
    pub unchanged: Vec<PathBuf>,
}

/// Write units under `dir`, creating directories as needed.
///
/// Files whose contents would not change are left untouched.
pub fn write_units(dir: &Path, units: &[OutputUnit]) -> GenResult<WriteReport> {
    let mut report = WriteReport::default();
    for unit in units {
        let path = dir.join(&unit.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| GenError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if fs::read(&path).is_ok_and(|existing| existing == unit.contents.as_bytes()) {
            tracing::trace!(path = %path.display(), "unchanged");
            report.unchanged.push(path);
            continue;
        }

        fs::write(&path, &unit.contents).map_err(|source| GenError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = unit.contents.len(), "wrote unit");
        report.written.push(path);
    }
    Ok(report)
}
