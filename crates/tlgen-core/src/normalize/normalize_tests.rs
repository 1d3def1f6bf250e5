#![allow(non_snake_case)]

use super::*;
use crate::schema::{Builtin, Constructor, Function, Type};

fn int() -> TypeExpr {
    TypeExpr::Builtin(Builtin::Int)
}

fn schema_of(types: Vec<Type>, functions: Vec<Function>) -> Schema {
    Schema::from_parts(types, functions).unwrap()
}

fn run_default(schema: &mut Schema) -> Result<(), SchemaError> {
    normalize(schema, &default_passes())
}

#[test]
fn ReplaceAnonymousArgs___unnamed_fields___get_positional_names() {
    let mut schema = schema_of(
        vec![Type::new(
            "a.T",
            vec![Constructor::new(
                "a.t",
                1,
                vec![Field::required("", int()), Field::required("x", int()), Field::required("", int())],
            )],
        )],
        vec![],
    );

    ReplaceAnonymousArgs.run(&mut schema).unwrap();

    let names: Vec<&str> = schema.types["a.T"].constructors[0]
        .fields
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["arg0", "x", "arg2"]);
}

#[test]
fn ReplaceAnonymousArgs___generated_name_clash___is_anonymous_args_error() {
    let mut schema = schema_of(
        vec![],
        vec![Function::new(
            "a.f",
            1,
            vec![Field::required("", int()), Field::required("arg0", int())],
            int(),
        )],
    );

    let err = ReplaceAnonymousArgs.run(&mut schema).unwrap_err();

    assert_eq!(err.kind, SchemaErrorKind::AnonymousArgs);
}

#[test]
fn FinalCheck___valid_schema___passes() {
    let mut schema = schema_of(
        vec![Type::new("a.T", vec![Constructor::new("a.t", 1, vec![Field::required("v", int())])])],
        vec![Function::new("a.f", 2, vec![Field::optional("t", TypeExpr::named("a.T"), 0)], int())],
    );

    assert!(run_default(&mut schema).is_ok());
}

#[test]
fn FinalCheck___unknown_type_reference___fails() {
    let mut schema = schema_of(
        vec![],
        vec![Function::new("a.f", 2, vec![], TypeExpr::vector(TypeExpr::named("a.Missing")))],
    );

    let err = run_default(&mut schema).unwrap_err();

    assert_eq!(err.kind, SchemaErrorKind::FinalCheck);
    assert!(err.message.contains("a.Missing"));
}

#[test]
fn FinalCheck___duplicate_constructor_magic___fails() {
    let mut schema = schema_of(
        vec![
            Type::new("a.T", vec![Constructor::new("a.t", 7, vec![])]),
            Type::new("a.U", vec![Constructor::new("a.u", 7, vec![])]),
        ],
        vec![],
    );

    let err = run_default(&mut schema).unwrap_err();

    assert!(err.message.contains("share magic 0x00000007"));
}

#[test]
fn FinalCheck___duplicate_function_magic___fails() {
    let mut schema = schema_of(
        vec![],
        vec![Function::new("a.f", 9, vec![], int()), Function::new("a.g", 9, vec![], int())],
    );

    assert!(run_default(&mut schema).is_err());
}

#[test]
fn FinalCheck___function_and_constructor_share_magic___fails() {
    let mut schema = schema_of(
        vec![Type::new("a.T", vec![Constructor::new("a.t", 0x10, vec![])])],
        vec![Function::new("a.f", 0x10, vec![], int())],
    );

    let err = run_default(&mut schema).unwrap_err();

    assert!(err.message.contains("function `a.f` and constructor `a.t`"));
}

#[test]
fn FinalCheck___shared_mask_bit___fails() {
    let mut schema = schema_of(
        vec![],
        vec![Function::new(
            "a.f",
            1,
            vec![Field::optional("x", int(), 3), Field::optional("y", int(), 3)],
            int(),
        )],
    );

    let err = run_default(&mut schema).unwrap_err();

    assert!(err.message.contains("share mask bit 3"));
}

#[test]
fn FinalCheck___mask_bit_out_of_range___fails() {
    let mut schema = schema_of(
        vec![],
        vec![Function::new("a.f", 1, vec![Field::optional("x", int(), 32)], int())],
    );

    assert!(run_default(&mut schema).is_err());
}

#[test]
fn FinalCheck___type_without_constructors___fails() {
    let mut schema = schema_of(vec![Type::new("a.Empty", vec![])], vec![]);

    assert!(run_default(&mut schema).is_err());
}

#[test]
fn FinalCheck___duplicate_field_name___fails() {
    let mut schema = schema_of(
        vec![],
        vec![Function::new(
            "a.f",
            1,
            vec![Field::required("x", int()), Field::required("x", int())],
            int(),
        )],
    );

    assert!(run_default(&mut schema).is_err());
}

#[test]
fn normalize___stops_at_first_failing_pass() {
    struct AlwaysFails;
    impl NormalizationPass for AlwaysFails {
        fn name(&self) -> &'static str {
            "always-fails"
        }
        fn run(&self, _: &mut Schema) -> Result<(), SchemaError> {
            Err(SchemaError::new(SchemaErrorKind::Flattening, "cannot flatten"))
        }
    }
    let mut schema = schema_of(
        vec![],
        vec![Function::new("a.f", 1, vec![Field::required("", int())], int())],
    );
    let passes: Vec<Box<dyn NormalizationPass>> = vec![Box::new(AlwaysFails), Box::new(ReplaceAnonymousArgs)];

    let err = normalize(&mut schema, &passes).unwrap_err();

    assert_eq!(err.kind, SchemaErrorKind::Flattening);
    assert_eq!(schema.functions["a.f"].fields[0].name, "");
}
