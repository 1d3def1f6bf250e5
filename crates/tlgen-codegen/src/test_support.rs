//! Schema fixtures shared by unit tests

use tlgen_core::{GenSettings, Schema, default_passes, normalize, parse_schema};

pub(crate) const SAMPLE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/sample.json"
));

pub(crate) const STATSHOUSE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/statshouse.json"
));

fn normalized(source: &str) -> Schema {
    let mut schema = parse_schema(source).unwrap();
    normalize(&mut schema, &default_passes()).unwrap();
    schema
}

pub(crate) fn sample_schema() -> Schema {
    normalized(SAMPLE)
}

pub(crate) fn statshouse_schema() -> Schema {
    normalized(STATSHOUSE)
}

/// Binds two of the three server functions; `memcache.set` stays unbound
pub(crate) fn sample_settings() -> GenSettings {
    GenSettings::new()
        .with_handler("engine.stats", "EngineStatsHandler")
        .with_handler("memcache.get", "MemcacheGetHandler")
}
