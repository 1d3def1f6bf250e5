//! Naming convention utilities for code generation.
//!
//! Schema names are dotted (`namespace.name`); generated identifiers are not.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `statshouse.addMetricsBatch` | [`module_name`] | `statshouse` |
//! | `statshouse.addMetricsBatch` | [`short_name`] | `addMetricsBatch` |
//! | `addMetricsBatch` | [`to_snake_case`] | `add_metrics_batch` |
//! | `statshouse.metric` | [`struct_name`] | `c_statshouse_metric` |
//! | `statshouse.metric` | [`magic_define_name`] | `TL_STATSHOUSE_METRIC` |
//! | `memcache.get` | [`const_str_ident`] | `tl_str$memcache$get` |

use tlgen_core::ENGINE_QUERY_TYPE;

/// Module used for names without a namespace.
pub const COMMON_MODULE: &str = "common";

/// Struct-name prefix of the three generated entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityPrefix {
    /// `t_`: sum type dispatching on constructor magic
    Type,
    /// `c_`: one constructor of a sum type
    Constructor,
    /// `f_`: RPC function
    Function,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Type => "t_",
            EntityPrefix::Constructor => "c_",
            EntityPrefix::Function => "f_",
        }
    }
}

/// Namespace a schema name belongs to.
///
/// # Examples
///
/// ```
/// use tlgen_codegen::naming::module_name;
///
/// assert_eq!(module_name("memcache.get"), "memcache");
/// assert_eq!(module_name("Bool"), "common");
/// ```
pub fn module_name(name: &str) -> &str {
    match name.split_once('.') {
        Some((module, _)) => module,
        None => COMMON_MODULE,
    }
}

/// Name with its namespace stripped.
pub fn short_name(name: &str) -> &str {
    match name.split_once('.') {
        Some((_, rest)) => rest,
        None => name,
    }
}

/// Convert camelCase or PascalCase to snake_case.
///
/// # Examples
///
/// ```
/// use tlgen_codegen::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("addMetricsBatch"), "add_metrics_batch");
/// assert_eq!(to_snake_case("metric"), "metric");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;

    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }

    result
}

/// Generated struct name for an entity.
pub fn struct_name(prefix: EntityPrefix, name: &str) -> String {
    format!("{}{}", prefix.as_str(), name.replace(['.', '-'], "_"))
}

/// `#define` name carrying a combinator magic.
pub fn magic_define_name(name: &str) -> String {
    let module = module_name(name);
    let short = to_snake_case(short_name(name)).to_ascii_uppercase();
    if name.contains('.') {
        format!("TL_{}_{short}", module.to_ascii_uppercase())
    } else {
        format!("TL_{short}")
    }
}

/// Namespace holding one combinator's field-mask bits.
pub fn fields_mask_namespace(name: &str) -> String {
    format!("{}_fields_mask", to_snake_case(short_name(name)))
}

/// Identifier of an interned schema string.
pub fn const_str_ident(value: &str) -> String {
    format!("tl_str${}", value.replace('.', "$"))
}

/// Whether a type is the open-parameter query wrapper.
pub fn is_query_wrapper(name: &str) -> bool {
    name == ENGINE_QUERY_TYPE
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use test_case::test_case;

    #[test_case("statshouse.metric", "statshouse")]
    #[test_case("a.b.c", "a")]
    #[test_case("True", "common")]
    fn module_name___splits_at_first_dot(input: &str, expected: &str) {
        assert_eq!(module_name(input), expected);
    }

    #[test]
    fn short_name___keeps_everything_after_first_dot() {
        assert_eq!(short_name("a.b.c"), "b.c");
        assert_eq!(short_name("Bool"), "Bool");
    }

    #[test]
    fn to_snake_case___converts_camel_case() {
        assert_eq!(to_snake_case("addMetricsBatch"), "add_metrics_batch");
        assert_eq!(to_snake_case("getById"), "get_by_id");
    }

    #[test]
    fn to_snake_case___handles_simple_and_pascal_words() {
        assert_eq!(to_snake_case("metric"), "metric");
        assert_eq!(to_snake_case("Bool"), "bool");
        assert_eq!(to_snake_case("True"), "true");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn to_snake_case___keeps_existing_underscores() {
        assert_eq!(to_snake_case("str_value"), "str_value");
        assert_eq!(to_snake_case("not_found"), "not_found");
    }

    #[test]
    fn struct_name___prefixes_and_replaces_dots() {
        assert_eq!(struct_name(EntityPrefix::Constructor, "statshouse.metric"), "c_statshouse_metric");
        assert_eq!(struct_name(EntityPrefix::Type, "memcache.Value"), "t_memcache_Value");
        assert_eq!(struct_name(EntityPrefix::Function, "memcache.get"), "f_memcache_get");
    }

    #[test_case("statshouse.addMetricsBatch", "TL_STATSHOUSE_ADD_METRICS_BATCH")]
    #[test_case("statshouse.metric", "TL_STATSHOUSE_METRIC")]
    #[test_case("boolTrue", "TL_BOOL_TRUE")]
    fn magic_define_name___upper_snake_with_module(input: &str, expected: &str) {
        assert_eq!(magic_define_name(input), expected);
    }

    #[test]
    fn fields_mask_namespace___uses_snake_short_name() {
        assert_eq!(fields_mask_namespace("statshouse.addMetricsBatch"), "add_metrics_batch_fields_mask");
        assert_eq!(fields_mask_namespace("statshouse.metric"), "metric_fields_mask");
    }

    #[test]
    fn const_str_ident___replaces_dots() {
        assert_eq!(const_str_ident("memcache.get"), "tl_str$memcache$get");
        assert_eq!(const_str_ident("plain"), "tl_str$plain");
    }

    #[test]
    fn is_query_wrapper___matches_only_engine_query() {
        assert!(is_query_wrapper("engine.Query"));
        assert!(!is_query_wrapper("engine.query"));
    }
}
