//! Generated passes shared by unit tests

use tlgen_codegen::{Generated, generate};
use tlgen_core::{GenSettings, default_passes, parse_schema};

pub(crate) const SAMPLE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/sample.json"
));

pub(crate) const STATSHOUSE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/statshouse.json"
));

pub(crate) fn generated(source: &str, settings: &GenSettings) -> Generated {
    generate(parse_schema(source).unwrap(), settings, &default_passes()).unwrap()
}

pub(crate) fn sample_settings() -> GenSettings {
    GenSettings {
        untyped_rpc_used: true,
        ..GenSettings::new()
    }
    .with_handler("engine.stats", "EngineStatsHandler")
    .with_handler("memcache.get", "MemcacheGetHandler")
}

pub(crate) fn statshouse_settings() -> GenSettings {
    GenSettings::new().with_handler("statshouse.addMetricsBatch", "AddMetricsBatchHandler")
}
