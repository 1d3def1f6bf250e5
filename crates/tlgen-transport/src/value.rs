//! Dynamic values of schema entities

use std::collections::BTreeMap;

/// A value of any type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Double(f64),
    String(String),
    Nat(u32),
    /// Zero-width marker; as an optional field its presence sets the mask bit
    True,
    Maybe(Option<Box<Value>>),
    Vector(Vec<Value>),
    Dictionary(Vec<(String, Value)>),
    /// A constructor or function value
    Record(Record),
}

impl Value {
    pub fn some(value: Value) -> Self {
        Value::Maybe(Some(Box::new(value)))
    }

    pub fn none() -> Self {
        Value::Maybe(None)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Short description used in mismatch errors
    pub fn kind_name(&self) -> String {
        match self {
            Value::Int(_) => "int".to_string(),
            Value::Long(_) => "long".to_string(),
            Value::Double(_) => "double".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Nat(_) => "#".to_string(),
            Value::True => "true".to_string(),
            Value::Maybe(_) => "Maybe".to_string(),
            Value::Vector(_) => "vector".to_string(),
            Value::Dictionary(_) => "dictionary".to_string(),
            Value::Record(r) => format!("record `{}`", r.constructor),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

/// Field values of one constructor or function.
///
/// An optional field is present exactly when it has an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub constructor: String,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(constructor: impl Into<String>) -> Self {
        Self {
            constructor: constructor.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.fields.insert(field.into(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}
