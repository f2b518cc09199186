//! Attribute values: the data a validation run reads.
//!
//! An entity's attributes form a tree: plain objects nest, everything else is
//! a leaf. Dates, patterns, and references to other entities or collections
//! are leaves even though they carry structure of their own; the flattener
//! never descends into them.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use regex::Regex;

use crate::model::{Collection, Model};

/// Insertion-ordered attribute map. Key order is encounter order.
pub type Attributes = IndexMap<String, Value>;

/// A single attribute value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    /// A plain nested structure. The only variant the flattener recurses into.
    Object(Attributes),
    Date(DateTime<Utc>),
    Pattern(Regex),
    /// Reference to another entity.
    Entity(Arc<dyn Model>),
    /// Reference to a collection of entities.
    Collection(Arc<Collection>),
}

impl Value {
    /// True if the value counts as present for `required` and the length checks.
    ///
    /// Null, strings that are blank after trimming, and empty arrays are empty.
    pub fn has_value(&self) -> bool {
        match self {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// Numeric view of the value.
    ///
    /// Native numbers pass through; strings must look like a number
    /// (`-1,234.5` style, see [`crate::patterns::NUMBER`]).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) if crate::patterns::NUMBER.is_match(s) => {
                s.replace(',', "").parse().ok()
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name, used in fault messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Date(_) => "date",
            Value::Pattern(_) => "pattern",
            Value::Entity(_) => "entity",
            Value::Collection(_) => "collection",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Pattern(a), Value::Pattern(b)) => a.as_str() == b.as_str(),
            // References compare by identity.
            (Value::Entity(a), Value::Entity(b)) => Arc::ptr_eq(a, b),
            (Value::Collection(a), Value::Collection(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Object(fields) => f.debug_tuple("Object").field(fields).finish(),
            Value::Date(d) => write!(f, "Date({})", d.to_rfc3339()),
            Value::Pattern(re) => write!(f, "Pattern(/{}/)", re.as_str()),
            Value::Entity(m) => write!(f, "Entity({})", m.cid()),
            Value::Collection(c) => write!(f, "Collection(len={})", c.len()),
        }
    }
}

/// Stringified form used by the pattern and length validators.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Date(d) => f.write_str(&d.to_rfc3339()),
            Value::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Value::Entity(m) => f.write_str(m.cid()),
            Value::Collection(c) => write!(f, "[collection:{}]", c.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Regex> for Value {
    fn from(re: Regex) -> Self {
        Value::Pattern(re)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::String(n.to_string())
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

/// Build an attribute map from a JSON object.
///
/// Non-object JSON yields an empty map.
pub fn attributes_from_json(json: serde_json::Value) -> Attributes {
    match Value::from(json) {
        Value::Object(attrs) => attrs,
        _ => Attributes::new(),
    }
}
