//! oneOf: the value must equal one of a fixed list.

use async_trait::async_trait;

use crate::rules::Param;
use crate::validators::{Check, Outcome, Validator, ValidatorFault};

/// Membership validator.
pub struct OneOf;

#[async_trait]
impl Validator for OneOf {
    fn name(&self) -> &str {
        "oneOf"
    }

    async fn validate(&self, check: &Check<'_>) -> Result<Outcome, ValidatorFault> {
        let Param::List(allowed) = check.param else {
            return Err(ValidatorFault::bad_param("oneOf", "a list", check.param));
        };
        if allowed.iter().any(|v| v == check.value) {
            Ok(Outcome::Pass)
        } else {
            Ok(check.fail("oneOf", &[check.param]))
        }
    }
}
