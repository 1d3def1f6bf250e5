#![allow(non_snake_case)]

use super::*;
use crate::test_support::statshouse_schema;
use test_case::test_case;
use tlgen_core::{Constructor, Field};

fn metric(schema: &tlgen_core::Schema) -> &Constructor {
    schema.constructor_by_magic(0x3325d884).unwrap()
}

fn field_names(body: &[Stmt]) -> Vec<&str> {
    body.iter()
        .filter_map(|s| match s {
            Stmt::Field { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

#[test_case(TypeExpr::Builtin(Builtin::Int), Codec::Builtin(Builtin::Int); "builtin")]
#[test_case(TypeExpr::named("a.T"), Codec::Type("a.T".into()); "named type")]
#[test_case(
    TypeExpr::maybe(TypeExpr::Builtin(Builtin::Long)),
    Codec::Maybe(Box::new(Codec::Builtin(Builtin::Long)));
    "maybe"
)]
#[test_case(
    TypeExpr::vector(TypeExpr::named("a.T")),
    Codec::Vector(Box::new(Codec::Type("a.T".into())));
    "vector"
)]
#[test_case(
    TypeExpr::dictionary(TypeExpr::vector(TypeExpr::Builtin(Builtin::String))),
    Codec::Dictionary(Box::new(Codec::Vector(Box::new(Codec::Builtin(Builtin::String)))));
    "nested"
)]
fn CodecBuilder___build___mirrors_type_expr(ty: TypeExpr, expected: Codec) {
    assert_eq!(CodecBuilder::build(&ty), expected);
}

#[test]
fn combinator_store___metric___magic_then_mask_then_declared_fields() {
    let schema = statshouse_schema();

    let store = combinator_store(metric(&schema));

    assert_eq!(store.kind, CodecKind::Constructor);
    assert_eq!(store.body[0], Stmt::WriteMagic(0x3325d884));
    assert_eq!(store.body[1], Stmt::WriteFieldsMask);
    assert_eq!(
        field_names(&store.body),
        vec!["name", "tags", "counter", "ts", "value", "unique", "stop", "new_counter_semantic"]
    );
}

#[test]
fn combinator_fetch___metric___reads_mask_first_and_no_magic() {
    let schema = statshouse_schema();

    let fetch = combinator_fetch(metric(&schema));

    assert_eq!(fetch.body[0], Stmt::ReadFieldsMask);
    assert_eq!(fetch.written_magic(), None);
    assert_eq!(field_names(&fetch.body), field_names(&combinator_store(metric(&schema)).body));
}

#[test]
fn combinator_store___no_optional_fields___has_no_mask() {
    let schema = statshouse_schema();
    let batch = &schema.functions["statshouse.addMetricsBatch"];

    let store = combinator_store(batch);
    let fetch = combinator_fetch(batch);

    assert_eq!(store.kind, CodecKind::Function);
    assert!(!store.body.contains(&Stmt::WriteFieldsMask));
    assert!(!fetch.body.contains(&Stmt::ReadFieldsMask));
    assert_eq!(
        store.body[1],
        Stmt::Field {
            name: "metrics".into(),
            codec: Codec::Vector(Box::new(Codec::Type("statshouse.Metric".into()))),
            mask_bit: None,
        }
    );
}

#[test]
fn combinator_store___optional_field___keeps_its_bit() {
    let schema = statshouse_schema();

    let store = combinator_store(metric(&schema));

    let ts = store
        .body
        .iter()
        .find(|s| matches!(s, Stmt::Field { name, .. } if name == "ts"))
        .unwrap();
    assert!(matches!(ts, Stmt::Field { mask_bit: Some(5), codec: Codec::Builtin(Builtin::Nat), .. }));
}

#[test]
fn type_codecs___sum_type___forward_and_switch_over_all_constructors() {
    let t = Type::new(
        "Bool",
        vec![
            Constructor::new("boolFalse", 0xbc799737, vec![]),
            Constructor::new("boolTrue", 0x997275b5, vec![]),
        ],
    );

    let [store, fetch] = type_codecs(&t);

    let Stmt::SwitchMagic { cases } = &fetch.body[0] else {
        panic!("type fetch must switch on magic");
    };
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[1].magic, 0x997275b5);
    assert!(matches!(&store.body[0], Stmt::ForwardToVariant { cases } if cases.len() == 2));
}

#[test]
fn function_result_codecs___use_result_codec() {
    let f = Function::new("a.f", 1, vec![], TypeExpr::vector(TypeExpr::named("a.T")));

    let [store, fetch] = function_result_codecs(&f);

    let expected = Stmt::Result(Codec::Vector(Box::new(Codec::Type("a.T".into()))));
    assert_eq!(store.body, vec![expected.clone()]);
    assert_eq!(fetch.body, vec![expected]);
    assert_eq!(store.kind, CodecKind::FunctionResult);
}

#[test]
fn CodecSet___shared_type___generated_once() {
    let schema = statshouse_schema();
    let metric_type = &schema.types["statshouse.Metric"];
    let mut set = CodecSet::new();

    set.add_type(metric_type);
    let len = set.len();
    set.add_type(metric_type);

    assert_eq!(set.len(), len);
    assert_eq!(len, 4);
}

#[test]
fn CodecSet___function___gets_body_and_result_codecs() {
    let f = Function::new(
        "a.f",
        1,
        vec![Field::optional("x", TypeExpr::Builtin(Builtin::Int), 0)],
        TypeExpr::Builtin(Builtin::Int),
    );
    let mut set = CodecSet::new();

    set.add_function(&f);

    assert_eq!(set.len(), 4);
    assert!(set.get(&CodecKey::new(CodecKind::FunctionResult, "a.f", CodecOp::Fetch)).is_some());
    assert!(!set.insert(combinator_store(&f)));
}
