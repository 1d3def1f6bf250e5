#![allow(non_snake_case)]

use super::*;
use crate::collector::collect_target_objects;
use crate::test_support::{sample_schema, sample_settings};
use std::collections::{BTreeMap, BTreeSet};
use tlgen_core::HandlerResolver;

#[test]
fn server_dispatch___bound_functions___one_case_each() {
    let schema = sample_schema();
    let settings = sample_settings();
    let ctx = CompilationContext::new(&schema, &settings);

    let dispatch = server_dispatch(&ctx);

    let cases: Vec<(u32, &str, &str)> = dispatch
        .cases
        .iter()
        .map(|c| (c.magic, c.function.as_str(), c.handler.as_str()))
        .collect();
    assert_eq!(
        cases,
        vec![
            (0x5b2e0a4d, "engine.stats", "EngineStatsHandler"),
            (0xd33b13ae, "memcache.get", "MemcacheGetHandler"),
        ]
    );
}

#[test]
fn server_dispatch___unbound_function___silently_skipped() {
    let schema = sample_schema();
    let settings = sample_settings();
    let ctx = CompilationContext::new(&schema, &settings);

    let dispatch = server_dispatch(&ctx);

    assert!(dispatch.case_for(0xeeeb54c4).is_none());
}

#[test]
fn server_dispatch___no_bindings___keeps_baseline_include() {
    let schema = sample_schema();
    let settings = tlgen_core::GenSettings::new();
    let ctx = CompilationContext::new(&schema, &settings);

    let dispatch = server_dispatch(&ctx);

    assert!(dispatch.cases.is_empty());
    assert_eq!(
        dispatch.includes,
        BTreeSet::from([Include::Header(BASELINE_INCLUDE.to_string())])
    );
}

#[test]
fn server_dispatch___includes_modules_of_bound_functions() {
    let schema = sample_schema();
    let settings = sample_settings();
    let ctx = CompilationContext::new(&schema, &settings);

    let dispatch = server_dispatch(&ctx);

    assert!(dispatch.includes.contains(&Include::Module("engine".into())));
    assert!(dispatch.includes.contains(&Include::Module("memcache".into())));
    assert_eq!(dispatch.includes.len(), 3);
}

#[test]
fn server_dispatch___external_resolver___overrides_settings() {
    let schema = sample_schema();
    let settings = sample_settings();
    let resolver: BTreeMap<String, String> =
        BTreeMap::from([("memcache.set".to_string(), "MemcacheSetHandler".to_string())]);
    let ctx = CompilationContext::with_resolver(&schema, &settings, &resolver);

    let dispatch = server_dispatch(&ctx);

    assert_eq!(dispatch.cases.len(), 1);
    assert_eq!(dispatch.cases[0].function, "memcache.set");
    assert_eq!(
        resolver.handler_for(&schema.functions["memcache.set"]).as_deref(),
        Some("MemcacheSetHandler")
    );
}

fn sample_with_internal_server_function() -> Schema {
    let mut schema = sample_schema();
    if let Some(pid) = schema.functions.get_mut("engine.pid") {
        pid.rpc_server = true;
    }
    schema
}

#[test]
fn server_dispatch___bound_internal_function_not_generated___skipped() {
    let schema = sample_with_internal_server_function();
    let settings = tlgen_core::GenSettings::new().with_handler("engine.pid", "EnginePidHandler");
    let ctx = CompilationContext::new(&schema, &settings);

    let dispatch = server_dispatch(&ctx);

    assert!(dispatch.cases.is_empty());
    assert!(!dispatch.includes.contains(&Include::Module("engine".into())));
}

#[test]
fn server_dispatch___bound_internal_function_with_internals___dispatched() {
    let schema = sample_with_internal_server_function();
    let mut settings =
        tlgen_core::GenSettings::new().with_handler("engine.pid", "EnginePidHandler");
    settings.gen_tl_internals = true;
    let ctx = CompilationContext::new(&schema, &settings);

    let dispatch = server_dispatch(&ctx);

    assert_eq!(dispatch.cases.len(), 1);
    assert_eq!(dispatch.cases[0].function, "engine.pid");
    assert_eq!(dispatch.cases[0].handler, "EnginePidHandler");
}

#[test]
fn magic_table___parallel_arrays_sorted_by_magic() {
    let schema = sample_schema();

    let table = magic_table(&schema);

    assert_eq!(table.ids.len(), table.names.len());
    assert_eq!(table.len(), schema.functions.len());
    assert!(table.ids.windows(2).all(|w| w[0] < w[1]));
    for (magic, name) in table.iter() {
        assert_eq!(schema.functions[name].magic, magic);
    }
    assert_eq!(table.names[0], "messages.send");
}

#[test]
fn magic_table___includes_internal_functions() {
    let schema = sample_schema();

    let table = magic_table(&schema);

    assert!(table.names.iter().any(|n| n == "engine.pid"));
}

#[test]
fn storer_table___generated_functions___interned_and_hashed() {
    let schema = sample_schema();
    let settings = sample_settings();
    let mut ctx = CompilationContext::new(&schema, &settings);
    collect_target_objects(&mut ctx);

    let table = storer_table(&mut ctx);

    let names: Vec<&str> = table.entries.iter().map(|e| e.function.as_str()).collect();
    assert_eq!(
        names,
        vec!["engine.stats", "memcache.get", "memcache.set", "messages.send"]
    );
    for entry in &table.entries {
        assert_eq!(entry.hash, name_hash(&entry.function));
        assert!(ctx.const_strings().contains(&entry.function));
    }
    assert_eq!(table.entries[1].name_ident, "tl_str$memcache$get");
}

#[test]
fn name_hash___is_crc32_of_name() {
    assert_eq!(name_hash(""), 0);
    assert_eq!(name_hash("a"), 0xe8b7be43);
    assert!(name_hash("memcache.get") >= 0);
}
