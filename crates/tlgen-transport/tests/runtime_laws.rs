//! Property-based tests for generated store/fetch code
//!
//! Runs the statshouse schema through the generator and checks, over random
//! metric values, that every legal field-mask round-trips and that the mask
//! written on the wire is exactly the set of present optional fields.

use proptest::prelude::*;
use tlgen_codegen::constants::fields_mask_consts;
use tlgen_codegen::ir::CodecKind;
use tlgen_codegen::{Generated, generate};
use tlgen_core::{Combinator, GenSettings, default_passes, parse_schema};
use tlgen_transport::{Evaluator, Record, Value, WireReader, WireWriter};

const STATSHOUSE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/statshouse.json"
));

fn statshouse() -> Generated {
    generate(
        parse_schema(STATSHOUSE).expect("fixture parses"),
        &GenSettings::new(),
        &default_passes(),
    )
    .expect("fixture generates")
}

// Strategy: finite doubles only, NaN never compares equal
fn arb_double() -> impl Strategy<Value = f64> {
    -1.0e12f64..1.0e12f64
}

fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof!["[a-z_]{0,12}", "\\PC{250,300}"]
}

/// A metric with every optional field independently present or absent
fn arb_metric() -> impl Strategy<Value = Record> {
    (
        arb_string(),
        prop::collection::vec(("[a-z]{1,8}", arb_string()), 0..4),
        proptest::option::of(arb_double()),
        proptest::option::of(any::<u32>()),
        proptest::option::of(prop::collection::vec(arb_double(), 0..4)),
        proptest::option::of(prop::collection::vec(any::<i64>(), 0..4)),
        proptest::option::of(prop::collection::vec(arb_string(), 0..3)),
        any::<bool>(),
    )
        .prop_map(|(name, tags, counter, ts, value, unique, stop, new_counter)| {
            let mut metric = Record::new("statshouse.metric")
                .with("name", Value::String(name))
                .with(
                    "tags",
                    Value::Dictionary(
                        tags.into_iter()
                            .map(|(k, v)| (k, Value::String(v)))
                            .collect(),
                    ),
                );
            if let Some(counter) = counter {
                metric = metric.with("counter", Value::Double(counter));
            }
            if let Some(ts) = ts {
                metric = metric.with("ts", Value::Nat(ts));
            }
            if let Some(value) = value {
                metric = metric.with(
                    "value",
                    Value::Vector(value.into_iter().map(Value::Double).collect()),
                );
            }
            if let Some(unique) = unique {
                metric = metric.with(
                    "unique",
                    Value::Vector(unique.into_iter().map(Value::Long).collect()),
                );
            }
            if let Some(stop) = stop {
                metric = metric.with(
                    "stop",
                    Value::Vector(stop.into_iter().map(Value::String).collect()),
                );
            }
            if new_counter {
                metric = metric.with("new_counter_semantic", Value::True);
            }
            metric
        })
}

proptest! {
    /// Property: fetch(store(metric)) == metric for every field combination
    #[test]
    fn proptest_metric_roundtrip(metric in arb_metric()) {
        let evaluator = Evaluator::from_generated(&statshouse());
        let mut w = WireWriter::new();
        evaluator
            .store_combinator(&mut w, CodecKind::Constructor, &metric)
            .expect("store should succeed for a well-formed metric");
        let bytes = w.into_bytes();

        let mut r = WireReader::new(&bytes);
        let fetched = evaluator
            .fetch_boxed(&mut r, CodecKind::Constructor, "statshouse.metric")
            .expect("fetch should succeed for stored bytes");

        prop_assert_eq!(fetched, metric);
        prop_assert!(r.is_empty());
    }

    /// Property: the written mask has exactly the bits of the present optional fields
    #[test]
    fn proptest_metric_mask_matches_presence(metric in arb_metric()) {
        let generated = statshouse();
        let evaluator = Evaluator::from_generated(&generated);
        let schema = parse_schema(STATSHOUSE).expect("fixture parses");
        let constructor = schema
            .constructors()
            .find(|c| c.name == "statshouse.metric")
            .expect("fixture has the metric constructor");
        let mut w = WireWriter::new();
        evaluator
            .store_combinator(&mut w, CodecKind::Constructor, &metric)
            .expect("store should succeed for a well-formed metric");
        let bytes = w.into_bytes();

        let written = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let expected = constructor
            .optional_fields()
            .filter(|f| metric.has(&f.name))
            .filter_map(|f| f.mask_bit)
            .fold(0u32, |mask, bit| mask | (1 << bit));

        prop_assert_eq!(written, expected);
        prop_assert_eq!(written & !constructor.fields_mask_all(), 0);
    }
}

#[test]
fn metric_fields_mask_all___or_of_every_optional_bit() {
    let schema = parse_schema(STATSHOUSE).expect("fixture parses");
    let constructor = schema
        .constructors()
        .find(|c| c.name == "statshouse.metric")
        .expect("fixture has the metric constructor");

    let consts = fields_mask_consts(constructor);
    let or_of_bits = consts
        .bits
        .iter()
        .fold(0u32, |mask, (_, bit)| mask | (1 << bit));

    assert_eq!(consts.all, 0x0100_002f);
    assert_eq!(consts.all, or_of_bits);
}

#[test]
fn batch_fields_mask_all___no_optional_fields() {
    let schema = parse_schema(STATSHOUSE).expect("fixture parses");
    let batch = schema
        .functions
        .get("statshouse.addMetricsBatch")
        .expect("fixture has the batch function");

    assert_eq!(batch.magic(), 0x5658_0239);
    assert_eq!(fields_mask_consts(batch).all, 0);
}
