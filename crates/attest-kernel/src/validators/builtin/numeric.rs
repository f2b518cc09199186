//! min, max, range: numeric bounds, all inclusive.
//!
//! Values are read through [`Value::as_number`](crate::Value::as_number):
//! native numbers, or strings shaped like a number. Anything else fails.

use async_trait::async_trait;

use crate::rules::Param;
use crate::validators::{Check, Outcome, Validator, ValidatorFault};

fn bound(kind: &str, param: &Param) -> Result<f64, ValidatorFault> {
    match param {
        Param::Number(n) => Ok(*n),
        other => Err(ValidatorFault::bad_param(kind, "a number", other)),
    }
}

/// Value must be `>= min`.
pub struct Min;

#[async_trait]
impl Validator for Min {
    fn name(&self) -> &str {
        "min"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        let min = bound("min", check.param)?;
        match check.value.as_number() {
            Some(n) if n >= min => Ok(Outcome::Pass),
            _ => Ok(check.fail("min", &[&min])),
        }
    }
}

/// Value must be `<= max`.
pub struct Max;

#[async_trait]
impl Validator for Max {
    fn name(&self) -> &str {
        "max"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        let max = bound("max", check.param)?;
        match check.value.as_number() {
            Some(n) if n <= max => Ok(Outcome::Pass),
            _ => Ok(check.fail("max", &[&max])),
        }
    }
}

/// Value must lie in `[lo, hi]`.
pub struct Range;

#[async_trait]
impl Validator for Range {
    fn name(&self) -> &str {
        "range"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        let Param::Range(lo, hi) = check.param else {
            return Err(ValidatorFault::bad_param("range", "a (min, max) pair", check.param));
        };
        match check.value.as_number() {
            Some(n) if n >= *lo && n <= *hi => Ok(Outcome::Pass),
            _ => Ok(check.fail("range", &[lo, hi])),
        }
    }
}
