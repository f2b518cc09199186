//! Turning declarations into ordered validator descriptors.

use std::fmt;

use super::{Declaration, Param};

/// The kind of a validator step.
///
/// Built-in kinds are a closed set; anything else a host registers is
/// `Custom`. Whether a kind is actually registered is decided at lookup time,
/// never here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    Required,
    Acceptance,
    Min,
    Max,
    Range,
    Length,
    MinLength,
    MaxLength,
    RangeLength,
    OneOf,
    EqualTo,
    Pattern,
    Fn,
    Custom(String),
}

impl ValidatorKind {
    /// Every built-in kind, in library order.
    pub const BUILTIN: [ValidatorKind; 13] = [
        ValidatorKind::Required,
        ValidatorKind::Acceptance,
        ValidatorKind::Min,
        ValidatorKind::Max,
        ValidatorKind::Range,
        ValidatorKind::Length,
        ValidatorKind::MinLength,
        ValidatorKind::MaxLength,
        ValidatorKind::RangeLength,
        ValidatorKind::OneOf,
        ValidatorKind::EqualTo,
        ValidatorKind::Pattern,
        ValidatorKind::Fn,
    ];

    /// Parse a kind name as it appears in a rule map.
    pub fn from_name(name: &str) -> Self {
        match name {
            "required" => ValidatorKind::Required,
            "acceptance" => ValidatorKind::Acceptance,
            "min" => ValidatorKind::Min,
            "max" => ValidatorKind::Max,
            "range" => ValidatorKind::Range,
            "length" => ValidatorKind::Length,
            "minLength" => ValidatorKind::MinLength,
            "maxLength" => ValidatorKind::MaxLength,
            "rangeLength" => ValidatorKind::RangeLength,
            "oneOf" => ValidatorKind::OneOf,
            "equalTo" => ValidatorKind::EqualTo,
            "pattern" => ValidatorKind::Pattern,
            "fn" => ValidatorKind::Fn,
            other => ValidatorKind::Custom(other.to_string()),
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, ValidatorKind::Custom(_))
    }

    /// Registry key for this kind.
    pub fn name(&self) -> &str {
        match self {
            ValidatorKind::Required => "required",
            ValidatorKind::Acceptance => "acceptance",
            ValidatorKind::Min => "min",
            ValidatorKind::Max => "max",
            ValidatorKind::Range => "range",
            ValidatorKind::Length => "length",
            ValidatorKind::MinLength => "minLength",
            ValidatorKind::MaxLength => "maxLength",
            ValidatorKind::RangeLength => "rangeLength",
            ValidatorKind::OneOf => "oneOf",
            ValidatorKind::EqualTo => "equalTo",
            ValidatorKind::Pattern => "pattern",
            ValidatorKind::Fn => "fn",
            ValidatorKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One executable validator step for one attribute.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub kind: ValidatorKind,
    pub param: Param,
    /// Overrides the validator's own failure message.
    pub message: Option<String>,
}

impl Descriptor {
    pub fn new(kind: ValidatorKind, param: Param) -> Self {
        Self {
            kind,
            param,
            message: None,
        }
    }
}

/// Normalize a declaration into descriptors, in declaration order.
///
/// Always returns a list. A function or method name becomes a single `fn`
/// step; every entry of a rule map becomes one step carrying the map's shared
/// message; lists are normalized element by element and concatenated.
pub fn normalize(declaration: &Declaration) -> Vec<Descriptor> {
    let mut out = Vec::new();
    normalize_into(declaration, &mut out);
    out
}

fn normalize_into(declaration: &Declaration, out: &mut Vec<Descriptor>) {
    match declaration {
        Declaration::Function(v) => {
            out.push(Descriptor::new(ValidatorKind::Fn, Param::Validator(v.clone())));
        }
        Declaration::Method(name) => {
            out.push(Descriptor::new(ValidatorKind::Fn, Param::Text(name.clone())));
        }
        Declaration::Map(map) => {
            let message = map.shared_message().map(str::to_string);
            out.extend(map.entries().map(|(kind, param)| Descriptor {
                kind: ValidatorKind::from_name(kind),
                param: param.clone(),
                message: message.clone(),
            }));
        }
        Declaration::List(items) => {
            for item in items {
                normalize_into(item, out);
            }
        }
    }
}
