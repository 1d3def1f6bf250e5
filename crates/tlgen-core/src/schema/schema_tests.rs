#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

fn metric_constructor() -> Constructor {
    Constructor::new(
        "statshouse.metric",
        0x3325d884,
        vec![
            Field::required("name", TypeExpr::Builtin(Builtin::String)),
            Field::optional("counter", TypeExpr::Builtin(Builtin::Double), 0),
            Field::optional("ts", TypeExpr::Builtin(Builtin::Nat), 5),
            Field::optional("value", TypeExpr::vector(TypeExpr::Builtin(Builtin::Double)), 1),
            Field::optional("unique", TypeExpr::vector(TypeExpr::Builtin(Builtin::Long)), 2),
            Field::optional("stop", TypeExpr::vector(TypeExpr::Builtin(Builtin::String)), 3),
            Field::optional("new_counter_semantic", TypeExpr::Builtin(Builtin::True), 24),
        ],
    )
}

#[test]
fn Combinator___fields_mask_all___ors_every_optional_bit() {
    let metric = metric_constructor();

    assert_eq!(metric.fields_mask_all(), 0x0100002f);
}

#[test]
fn Combinator___fields_mask_all___is_zero_without_optional_fields() {
    let batch = Function::new(
        "statshouse.addMetricsBatch",
        0x56580239,
        vec![Field::required(
            "metrics",
            TypeExpr::vector(TypeExpr::named("statshouse.Metric")),
        )],
        TypeExpr::named("True"),
    );

    assert_eq!(batch.fields_mask_all(), 0x00000000);
    assert!(!batch.has_optional_fields());
}

#[test]
fn Combinator___optional_fields___keeps_declaration_order() {
    let metric = metric_constructor();

    let names: Vec<&str> = metric.optional_fields().map(|f| f.name.as_str()).collect();

    assert_eq!(
        names,
        vec!["counter", "ts", "value", "unique", "stop", "new_counter_semantic"]
    );
}

#[test]
fn Combinator___kind___distinguishes_functions_and_constructors() {
    let f = Function::new("a.f", 1, vec![], TypeExpr::Builtin(Builtin::Int));

    assert_eq!(f.kind(), CombinatorKind::Function);
    assert_eq!(metric_constructor().kind(), CombinatorKind::Constructor);
}

#[test_case("int", Some(Builtin::Int))]
#[test_case("long", Some(Builtin::Long))]
#[test_case("double", Some(Builtin::Double))]
#[test_case("string", Some(Builtin::String))]
#[test_case("#", Some(Builtin::Nat))]
#[test_case("true", Some(Builtin::True))]
#[test_case("True", None)]
fn Builtin___from_name___resolves_schema_spellings(name: &str, expected: Option<Builtin>) {
    assert_eq!(Builtin::from_name(name), expected);
}

#[test]
fn TypeExpr___deserialize___reads_nested_wrappers() {
    let json = r#"{"maybe": {"vector": "engine.Stat"}}"#;

    let ty: TypeExpr = serde_json::from_str(json).unwrap();

    assert_eq!(
        ty,
        TypeExpr::maybe(TypeExpr::vector(TypeExpr::named("engine.Stat")))
    );
}

#[test]
fn TypeExpr___deserialize___builtin_names_are_not_type_refs() {
    let ty: TypeExpr = serde_json::from_str(r#"{"dictionary": "string"}"#).unwrap();

    assert_eq!(ty, TypeExpr::dictionary(TypeExpr::Builtin(Builtin::String)));
}

#[test]
fn TypeExpr___display___uses_schema_syntax() {
    let ty = TypeExpr::maybe(TypeExpr::vector(TypeExpr::Builtin(Builtin::Nat)));

    assert_eq!(ty.to_string(), "(Maybe (vector #))");
}

#[test]
fn TypeExpr___referenced_types___walks_every_wrapper() {
    let ty = TypeExpr::dictionary(TypeExpr::maybe(TypeExpr::named("a.B")));

    assert_eq!(ty.referenced_types(), vec!["a.B"]);
}

#[test]
fn TypeExpr___accept___dispatches_by_variant() {
    struct Depth;
    impl TypeExprVisitor for Depth {
        type Output = usize;
        fn visit_builtin(&mut self, _: Builtin) -> usize {
            0
        }
        fn visit_named(&mut self, _: &str) -> usize {
            0
        }
        fn visit_maybe(&mut self, inner: &TypeExpr) -> usize {
            1 + inner.accept(self)
        }
        fn visit_vector(&mut self, inner: &TypeExpr) -> usize {
            1 + inner.accept(self)
        }
        fn visit_dictionary(&mut self, inner: &TypeExpr) -> usize {
            1 + inner.accept(self)
        }
    }

    let ty = TypeExpr::vector(TypeExpr::maybe(TypeExpr::vector(TypeExpr::named("x.Y"))));

    assert_eq!(ty.accept(&mut Depth), 3);
}

#[test]
fn Constructor___deserialize___accepts_hex_and_decimal_magic() {
    let hex: Constructor =
        serde_json::from_str(r#"{"name": "a.b", "magic": "0x3325d884"}"#).unwrap();
    let dec: Constructor = serde_json::from_str(r#"{"name": "a.b", "magic": 10}"#).unwrap();

    assert_eq!(hex.magic, 0x3325d884);
    assert_eq!(dec.magic, 10);
}

#[test]
fn Constructor___deserialize___rejects_unprefixed_hex() {
    let result = serde_json::from_str::<Constructor>(r#"{"name": "a.b", "magic": "3325d884"}"#);

    assert!(result.is_err());
}

#[test]
fn Schema___from_parts___rejects_duplicate_type_names() {
    let t = Type::new("a.T", vec![Constructor::new("a.t", 1, vec![])]);

    let result = Schema::from_parts(vec![t.clone(), t], vec![]);

    assert!(matches!(result, Err(e) if e.kind == SchemaErrorKind::Parse));
}

#[test]
fn Schema___lookups___find_entities_by_magic_and_name() {
    let t = Type::new(
        "a.T",
        vec![
            Constructor::new("a.t1", 1, vec![]),
            Constructor::new("a.t2", 2, vec![]),
        ],
    );
    let f = Function::new("a.f", 3, vec![], TypeExpr::named("a.T"));
    let schema = Schema::from_parts(vec![t], vec![f]).unwrap();

    assert_eq!(schema.constructor_by_magic(2).map(|c| c.name.as_str()), Some("a.t2"));
    assert_eq!(schema.function_by_magic(3).map(|f| f.name.as_str()), Some("a.f"));
    assert_eq!(schema.constructor_owner("a.t1").map(|t| t.name.as_str()), Some("a.T"));
    assert!(schema.function_by_magic(0xdeadbeef).is_none());
    assert_eq!(schema.constructors().count(), 2);
}
