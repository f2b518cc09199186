//! length, minLength, maxLength, rangeLength: character counts.
//!
//! The value is stringified and trimmed before counting. Empty values always
//! fail; pair these with `required: false` to make an attribute optional.

use async_trait::async_trait;

use crate::rules::Param;
use crate::validators::{Check, Outcome, Validator, ValidatorFault};
use crate::value::Value;

fn char_len(value: &Value) -> Option<f64> {
    if !value.has_value() {
        return None;
    }
    Some(value.to_string().trim().chars().count() as f64)
}

fn target(kind: &str, param: &Param) -> Result<f64, ValidatorFault> {
    match param {
        Param::Number(n) => Ok(*n),
        other => Err(ValidatorFault::bad_param(kind, "a number", other)),
    }
}

/// Exactly `n` characters.
pub struct Length;

#[async_trait]
impl Validator for Length {
    fn name(&self) -> &str {
        "length"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        let n = target("length", check.param)?;
        match char_len(check.value) {
            Some(len) if len == n => Ok(Outcome::Pass),
            _ => Ok(check.fail("length", &[&n])),
        }
    }
}

/// At least `n` characters.
pub struct MinLength;

#[async_trait]
impl Validator for MinLength {
    fn name(&self) -> &str {
        "minLength"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        let n = target("minLength", check.param)?;
        match char_len(check.value) {
            Some(len) if len >= n => Ok(Outcome::Pass),
            _ => Ok(check.fail("minLength", &[&n])),
        }
    }
}

/// At most `n` characters.
pub struct MaxLength;

#[async_trait]
impl Validator for MaxLength {
    fn name(&self) -> &str {
        "maxLength"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        let n = target("maxLength", check.param)?;
        match char_len(check.value) {
            Some(len) if len <= n => Ok(Outcome::Pass),
            _ => Ok(check.fail("maxLength", &[&n])),
        }
    }
}

/// Between `lo` and `hi` characters, inclusive.
pub struct RangeLength;

#[async_trait]
impl Validator for RangeLength {
    fn name(&self) -> &str {
        "rangeLength"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        let Param::Range(lo, hi) = check.param else {
            return Err(ValidatorFault::bad_param(
                "rangeLength",
                "a (min, max) pair",
                check.param,
            ));
        };
        match char_len(check.value) {
            Some(len) if len >= *lo && len <= *hi => Ok(Outcome::Pass),
            _ => Ok(check.fail("rangeLength", &[lo, hi])),
        }
    }
}
