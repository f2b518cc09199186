//! Validators: the trait, the invocation context, and the registry.
//!
//! A validator looks at one value and decides. It may decide immediately
//! (compare two numbers) or after awaiting something (a lookup elsewhere); the
//! chain runners do not care which. Returning `Err` means the validator itself
//! broke; the invoker turns that into a failure with the configured message.

pub mod builtin;
mod registry;

pub use registry::ValidatorRegistry;

use std::fmt::Display;

use async_trait::async_trait;
use thiserror::Error;

use crate::engine::Engine;
use crate::flatten;
use crate::messages::format_message;
use crate::model::Model;
use crate::rules::Param;
use crate::value::{Attributes, Value};

/// What a validator decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// This step passed; continue with the next one.
    Pass,
    /// Stop here and treat the whole attribute as valid.
    ///
    /// Used by `required` for empty values of optional attributes.
    Skip,
    /// This step failed; the message is user-facing.
    Fail(String),
}

impl Outcome {
    pub fn fail(message: impl Into<String>) -> Self {
        Outcome::Fail(message.into())
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Outcome::Fail(_))
    }
}

/// A validator raised instead of deciding.
#[derive(Debug, Error)]
pub enum ValidatorFault {
    #[error("{0}")]
    Message(String),

    #[error("no validator registered for kind `{0}`")]
    UnknownValidator(String),

    #[error("model has no method `{0}`")]
    MissingMethod(String),

    #[error("validator panicked: {0}")]
    Panicked(String),

    #[error("`{kind}` expects {expected}, got {got}")]
    BadParam {
        kind: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ValidatorFault {
    pub fn bad_param(kind: &str, expected: &'static str, got: &Param) -> Self {
        ValidatorFault::BadParam {
            kind: kind.to_string(),
            expected,
            got: got.type_name(),
        }
    }
}

/// Everything a validator sees for one step.
pub struct Check<'a> {
    /// The value under test.
    pub value: &'a Value,
    /// Dotted path of the attribute.
    pub attr: &'a str,
    /// The descriptor's parameter.
    pub param: &'a Param,
    /// The model being validated.
    pub model: &'a dyn Model,
    /// The prospective attributes of this run, flattened to dotted paths.
    pub computed: &'a Attributes,
    /// Messages, patterns and label formatting.
    pub engine: &'a Engine,
}

impl Check<'_> {
    /// Formatted label for an attribute path.
    pub fn label(&self, attr: &str) -> String {
        self.engine.label_formatter().format(attr, self.model)
    }

    /// Value at another path in the computed attributes.
    pub fn computed_value(&self, path: &str) -> Option<&Value> {
        flatten::lookup(self.computed, path)
    }

    /// Failure using the message template `key`.
    ///
    /// `{0}` is this attribute's label; `extra` fills `{1}` onward.
    pub fn fail(&self, key: &str, extra: &[&dyn Display]) -> Outcome {
        let label = self.label(self.attr);
        let mut args: Vec<&dyn Display> = Vec::with_capacity(extra.len() + 1);
        args.push(&label);
        args.extend_from_slice(extra);

        let template = self.engine.messages().get_or_fallback(key);
        Outcome::Fail(format_message(template, &args))
    }
}

/// A validation step implementation.
///
/// Built-ins are registered under their kind name; custom functions used in
/// `fn` rules and model methods implement the same trait.
///
/// Return `Err` for anything that keeps the validator from deciding. A panic
/// is caught too and treated the same way, but it still goes through the
/// process panic hook.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Registry key (kind name) or a descriptive name for custom functions.
    fn name(&self) -> &str;

    /// Decide for one value.
    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault>;
}

/// A synchronous closure wrapped as a [`Validator`].
pub struct FnValidator<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F> Validator for FnValidator<F>
where
    F: Fn(&Check<'_>) -> Result<Outcome, ValidatorFault> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        (self.f)(check)
    }
}

/// Wrap a synchronous closure as a validator.
///
/// ```ignore
/// let even = validator_fn("even", |check| match check.value {
///     Value::Int(i) if i % 2 == 0 => Ok(Outcome::Pass),
///     _ => Ok(Outcome::fail("must be even")),
/// });
/// ```
pub fn validator_fn<F>(name: impl Into<String>, f: F) -> FnValidator<F>
where
    F: Fn(&Check<'_>) -> Result<Outcome, ValidatorFault> + Send + Sync,
{
    FnValidator {
        name: name.into(),
        f,
    }
}
