//! Rule declarations.
//!
//! A model declares, per attribute path, one of:
//!
//! - a custom validator ([`Declaration::Function`])
//! - the name of a method on the model ([`Declaration::Method`])
//! - a map of validator kind → parameter ([`Declaration::Map`]), optionally
//!   with a shared `message`
//! - a list of the above ([`Declaration::List`])
//!
//! Declarations are normalized into [`Descriptor`] lists before a run; see
//! [`normalize`].

mod normalize;

pub use normalize::{Descriptor, ValidatorKind, normalize};

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;

use crate::validators::Validator;
use crate::value::{Attributes, Value};

/// Dynamic `required` predicate: `(value, attr, computed) -> required?`
pub type RequiredFn = Arc<dyn Fn(&Value, &str, &Attributes) -> bool + Send + Sync>;

/// Parameter handed to a validator.
#[derive(Clone)]
pub enum Param {
    /// No parameter (e.g. `acceptance`).
    None,
    Bool(bool),
    Number(f64),
    /// Inclusive bounds for `range` and `rangeLength`.
    Range(f64, f64),
    /// Attribute path, pattern name or method name.
    Text(String),
    List(Vec<Value>),
    Pattern(Regex),
    Predicate(RequiredFn),
    Validator(Arc<dyn Validator>),
}

impl Param {
    /// Short type name, used in fault messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Param::None => "none",
            Param::Bool(_) => "bool",
            Param::Number(_) => "number",
            Param::Range(..) => "range",
            Param::Text(_) => "text",
            Param::List(_) => "list",
            Param::Pattern(_) => "pattern",
            Param::Predicate(_) => "predicate",
            Param::Validator(_) => "validator",
        }
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::None => write!(f, "None"),
            Param::Bool(b) => write!(f, "Bool({b})"),
            Param::Number(n) => write!(f, "Number({n})"),
            Param::Range(lo, hi) => write!(f, "Range({lo}, {hi})"),
            Param::Text(s) => write!(f, "Text({s:?})"),
            Param::List(items) => f.debug_tuple("List").field(items).finish(),
            Param::Pattern(re) => write!(f, "Pattern(/{}/)", re.as_str()),
            Param::Predicate(_) => write!(f, "Predicate(..)"),
            Param::Validator(v) => write!(f, "Validator({})", v.name()),
        }
    }
}

/// Rendering used in failure messages.
impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::None | Param::Predicate(_) => Ok(()),
            Param::Bool(b) => write!(f, "{b}"),
            Param::Number(n) => write!(f, "{n}"),
            Param::Range(lo, hi) => write!(f, "{lo}-{hi}"),
            Param::Text(s) => f.write_str(s),
            Param::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(", "))
            }
            Param::Pattern(re) => f.write_str(re.as_str()),
            Param::Validator(v) => f.write_str(v.name()),
        }
    }
}

impl From<bool> for Param {
    fn from(b: bool) -> Self {
        Param::Bool(b)
    }
}

impl From<f64> for Param {
    fn from(n: f64) -> Self {
        Param::Number(n)
    }
}

impl From<i32> for Param {
    fn from(n: i32) -> Self {
        Param::Number(f64::from(n))
    }
}

impl From<(f64, f64)> for Param {
    fn from((lo, hi): (f64, f64)) -> Self {
        Param::Range(lo, hi)
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Text(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::Text(s)
    }
}

impl From<Vec<Value>> for Param {
    fn from(items: Vec<Value>) -> Self {
        Param::List(items)
    }
}

impl From<Regex> for Param {
    fn from(re: Regex) -> Self {
        Param::Pattern(re)
    }
}

impl From<Arc<dyn Validator>> for Param {
    fn from(v: Arc<dyn Validator>) -> Self {
        Param::Validator(v)
    }
}

/// Reserved rule-map key holding the shared message.
pub const MESSAGE_KEY: &str = "message";

/// Validator kind → parameter map for one attribute, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RuleMap {
    entries: IndexMap<String, Param>,
    message: Option<String>,
}

impl RuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule by kind name. Re-adding a kind replaces its parameter in place.
    ///
    /// `message` is reserved: a text parameter under that key becomes the
    /// shared message instead of a rule.
    pub fn with(mut self, kind: impl Into<String>, param: impl Into<Param>) -> Self {
        let kind = kind.into();
        let param = param.into();
        if kind != MESSAGE_KEY {
            self.entries.insert(kind, param);
        } else if let Param::Text(message) = param {
            self.message = Some(message);
        } else {
            tracing::warn!(param = param.type_name(), "ignoring non-text `message` entry");
        }
        self
    }

    /// Shared message used for any failure of this map's rules.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn required(self, required: bool) -> Self {
        self.with("required", required)
    }

    /// `required` decided per run from the value, path and computed attributes.
    pub fn required_if(
        self,
        predicate: impl Fn(&Value, &str, &Attributes) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.with("required", Param::Predicate(Arc::new(predicate)))
    }

    pub fn acceptance(self) -> Self {
        self.with("acceptance", Param::None)
    }

    pub fn min(self, min: impl Into<f64>) -> Self {
        self.with("min", Param::Number(min.into()))
    }

    pub fn max(self, max: impl Into<f64>) -> Self {
        self.with("max", Param::Number(max.into()))
    }

    pub fn range(self, lo: impl Into<f64>, hi: impl Into<f64>) -> Self {
        self.with("range", Param::Range(lo.into(), hi.into()))
    }

    pub fn length(self, len: impl Into<f64>) -> Self {
        self.with("length", Param::Number(len.into()))
    }

    pub fn min_length(self, len: impl Into<f64>) -> Self {
        self.with("minLength", Param::Number(len.into()))
    }

    pub fn max_length(self, len: impl Into<f64>) -> Self {
        self.with("maxLength", Param::Number(len.into()))
    }

    pub fn range_length(self, lo: impl Into<f64>, hi: impl Into<f64>) -> Self {
        self.with("rangeLength", Param::Range(lo.into(), hi.into()))
    }

    pub fn one_of<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.with("oneOf", Param::List(values))
    }

    /// Must equal the value at another attribute path.
    pub fn equal_to(self, other: impl Into<String>) -> Self {
        self.with("equalTo", Param::Text(other.into()))
    }

    /// A named pattern (`"email"`) or a compiled [`Regex`].
    pub fn pattern(self, pattern: impl Into<Param>) -> Self {
        self.with("pattern", pattern)
    }

    /// Custom validator.
    pub fn func(self, validator: impl Validator + 'static) -> Self {
        self.with("fn", Param::Validator(Arc::new(validator)))
    }

    /// Named model method.
    pub fn method(self, name: impl Into<String>) -> Self {
        self.with("fn", Param::Text(name.into()))
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn shared_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a model declares for one attribute path.
#[derive(Clone)]
pub enum Declaration {
    Function(Arc<dyn Validator>),
    Method(String),
    Map(RuleMap),
    List(Vec<Declaration>),
}

impl Declaration {
    /// Declaration backed by a custom validator.
    pub fn function(validator: impl Validator + 'static) -> Self {
        Declaration::Function(Arc::new(validator))
    }

    /// Declaration naming a model method.
    pub fn method(name: impl Into<String>) -> Self {
        Declaration::Method(name.into())
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Function(v) => write!(f, "Function({})", v.name()),
            Declaration::Method(name) => write!(f, "Method({name:?})"),
            Declaration::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Declaration::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl From<RuleMap> for Declaration {
    fn from(map: RuleMap) -> Self {
        Declaration::Map(map)
    }
}

impl From<&str> for Declaration {
    fn from(name: &str) -> Self {
        Declaration::Method(name.to_string())
    }
}

impl From<Vec<RuleMap>> for Declaration {
    fn from(maps: Vec<RuleMap>) -> Self {
        Declaration::List(maps.into_iter().map(Declaration::Map).collect())
    }
}

impl From<Vec<Declaration>> for Declaration {
    fn from(items: Vec<Declaration>) -> Self {
        Declaration::List(items)
    }
}

impl From<Arc<dyn Validator>> for Declaration {
    fn from(v: Arc<dyn Validator>) -> Self {
        Declaration::Function(v)
    }
}

/// A model's rule declarations, keyed by attribute path in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    by_path: IndexMap<String, Declaration>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the rule for `path`, replacing any earlier declaration.
    pub fn attr(mut self, path: impl Into<String>, declaration: impl Into<Declaration>) -> Self {
        self.by_path.insert(path.into(), declaration.into());
        self
    }

    pub fn get(&self, path: &str) -> Option<&Declaration> {
        self.by_path.get(path)
    }

    /// The validated attribute paths.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.by_path.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Declaration)> {
        self.by_path.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Normalized descriptors for `path`; empty when nothing is declared.
    pub fn descriptors(&self, path: &str) -> Vec<Descriptor> {
        self.get(path).map(normalize).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}
